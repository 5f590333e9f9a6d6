// tests/branching.rs
use approx::assert_relative_eq;
use glam::{Quat, Vec3};
use lsystem_garden::{
    ErrorKind, LSystemError, MeshSelector, TurtleConfig, TurtleInterpreter, TurtleOp,
};
use symbios::{SymbiosState, SymbolTable};

fn setup() -> TurtleInterpreter {
    TurtleInterpreter::new(TurtleConfig::default())
}

#[test]
fn test_side_branch_returns_to_branch_point() {
    let interpreter = setup();
    let root = interpreter.root_state();

    // F [ +F ] F
    // 1. Segment 0 from origin to (0, 0, 1).
    // 2. Push at (0, 0, 1), yaw by the spread (60 degrees about up).
    // 3. Segment 1 along the rotated heading.
    // 4. Pop back to (0, 0, 1) facing +Z; segment 2 continues to (0, 0, 2).
    let list = interpreter.interpret("F[+F]F", &root).unwrap();

    assert_eq!(list.len(), 3, "Should have 3 placements");
    assert_eq!(list.count(MeshSelector::Branch), 3);
    assert_eq!(list.count(MeshSelector::Ornament), 0);

    let segs = list.as_slice();
    assert!(segs[0].origin().abs_diff_eq(Vec3::ZERO, 1e-6));
    assert!(segs[0].tip().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));

    let side = Vec3::new(60f32.to_radians().sin(), 0.0, 60f32.to_radians().cos());
    assert!(segs[1].origin().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    assert!(
        segs[1]
            .tip()
            .abs_diff_eq(Vec3::new(0.0, 0.0, 1.0) + side, 1e-5)
    );

    assert!(segs[2].origin().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    assert!(segs[2].tip().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
    assert_eq!(segs[2].rotation, Quat::IDENTITY);
}

#[test]
fn test_segments_are_contiguous() {
    let interpreter = setup();
    let list = interpreter
        .interpret("F+F&F/F-F", &interpreter.root_state())
        .unwrap();

    for pair in list.as_slice().windows(2) {
        assert!(pair[0].tip().abs_diff_eq(pair[1].origin(), 1e-5));
    }
    for seg in &list {
        assert_relative_eq!(seg.scale, 1.0);
    }
}

#[test]
fn test_symmetric_branches_restore_root() {
    let interpreter = setup();
    let root = interpreter.root_state();

    // No moves, balanced brackets: the trailing ornament must sit exactly on the root.
    let list = interpreter.interpret("[+][-][&[^]][\\]A", &root).unwrap();
    let [flower] = list.as_slice() else {
        panic!("expected one ornament");
    };
    assert_eq!(flower.mesh, MeshSelector::Ornament);
    assert_eq!(flower.translation, root.position);
    assert_eq!(flower.rotation, root.rotation);
}

#[test]
fn test_pushed_copy_is_not_aliased() {
    let interpreter = setup();
    // Everything inside the brackets (moves, turns, shrink) is discarded by `]`.
    let list = interpreter
        .interpret("F[!+FF-fA]A", &interpreter.root_state())
        .unwrap();
    let last = list.as_slice().last().unwrap();
    assert_eq!(last.mesh, MeshSelector::Ornament);
    assert!(last.origin().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    assert_eq!(last.rotation, Quat::IDENTITY);
    assert_relative_eq!(last.scale, 1.0);
}

#[test]
fn test_spread_is_read_from_current_state() {
    let interpreter = setup();
    let narrow = interpreter.root_state().with_spread(30.0);
    let list = interpreter.interpret("+F", &narrow).unwrap();
    let expected = Vec3::new(30f32.to_radians().sin(), 0.0, 30f32.to_radians().cos());
    assert!(list.as_slice()[0].tip().abs_diff_eq(expected, 1e-5));
}

#[test]
fn test_lone_pop_fails_with_empty_partial() {
    let interpreter = setup();
    let err = interpreter
        .interpret("]", &interpreter.root_state())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Interpreter);
    assert!(err.partial().unwrap().is_empty());
}

#[test]
fn test_unmatched_pop_keeps_earlier_placements() {
    let interpreter = setup();
    let err = interpreter
        .interpret("FF[A]]FFF", &interpreter.root_state())
        .unwrap_err();
    match err {
        LSystemError::UnmatchedPop { position, partial } => {
            assert_eq!(position, 5);
            assert_eq!(partial.count(MeshSelector::Branch), 2);
            assert_eq!(partial.count(MeshSelector::Ornament), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unclosed_push_is_not_an_error() {
    let interpreter = setup();
    let list = interpreter
        .interpret("F[F[F", &interpreter.root_state())
        .unwrap();
    assert_eq!(list.len(), 3);
}

#[test]
fn test_interpretation_is_deterministic() {
    let interpreter = setup();
    let root = interpreter.root_state();
    let commands = "FF[+F[-FA]&FA]^F[\\F/A]FA";
    let a = interpreter.interpret(commands, &root).unwrap();
    let b = interpreter.interpret(commands, &root).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_symbios_state_matches_string() {
    let mut interner = SymbolTable::new();
    let interpreter = setup();

    // Intern symbols
    for sym in ["F", "[", "]", "+", "A"] {
        interner.intern(sym).unwrap();
    }
    let f_id = interner.resolve_id("F").unwrap();
    let push_id = interner.resolve_id("[").unwrap();
    let pop_id = interner.resolve_id("]").unwrap();
    let yaw_id = interner.resolve_id("+").unwrap();
    let a_id = interner.resolve_id("A").unwrap();

    // F [ + F ] F A
    let mut state = SymbiosState::new();
    for id in [f_id, push_id, yaw_id, f_id, pop_id, f_id, a_id] {
        state.push(id, 0.0, &[]).unwrap();
    }

    let root = interpreter.root_state();
    let from_state = interpreter
        .interpret_symbios(&state, &interner, &root)
        .unwrap();
    let from_string = interpreter.interpret("F[+F]FA", &root).unwrap();
    assert_eq!(from_state, from_string);
}

#[test]
fn test_symbios_parameters_override_length_and_angle() {
    let mut interner = SymbolTable::new();
    let mut interpreter = setup();
    interpreter.set_op('T', TurtleOp::Yaw(1.0));

    interner.intern("F").unwrap();
    interner.intern("T").unwrap();
    let f_id = interner.resolve_id("F").unwrap();
    let t_id = interner.resolve_id("T").unwrap();

    // T(90) F(2)
    let mut state = SymbiosState::new();
    state.push(t_id, 0.0, &[90.0]).unwrap();
    state.push(f_id, 0.0, &[2.0]).unwrap();

    let list = interpreter
        .interpret_symbios(&state, &interner, &interpreter.root_state())
        .unwrap();
    let [seg] = list.as_slice() else {
        panic!("expected one segment");
    };
    assert_relative_eq!(seg.scale, 2.0);
    assert!(seg.tip().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
}

#[test]
fn test_symbios_negative_length_is_not_mirrored() {
    let mut interner = SymbolTable::new();
    let interpreter = setup();

    interner.intern("F").unwrap();
    let f_id = interner.resolve_id("F").unwrap();

    // F(-2) F
    let mut state = SymbiosState::new();
    state.push(f_id, 0.0, &[-2.0]).unwrap();
    state.push(f_id, 0.0, &[]).unwrap();

    let list = interpreter
        .interpret_symbios(&state, &interner, &interpreter.root_state())
        .unwrap();
    let [first, second] = list.as_slice() else {
        panic!("expected two segments");
    };
    assert_relative_eq!(first.scale, 2.0);
    assert!(first.matrix().determinant() > 0.0);
    assert!(first.tip().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
    assert!(second.origin().abs_diff_eq(first.tip(), 1e-6));
}

#[test]
fn test_symbios_parameter_sets_branch_spread() {
    let mut interner = SymbolTable::new();
    let mut interpreter = setup();
    interpreter.set_op('S', TurtleOp::SetSpread(60.0));

    for sym in ["S", "[", "]", "+", "F"] {
        interner.intern(sym).unwrap();
    }
    let s_id = interner.resolve_id("S").unwrap();
    let push_id = interner.resolve_id("[").unwrap();
    let pop_id = interner.resolve_id("]").unwrap();
    let yaw_id = interner.resolve_id("+").unwrap();
    let f_id = interner.resolve_id("F").unwrap();

    // [ S(90) + F ] + F
    let mut state = SymbiosState::new();
    state.push(push_id, 0.0, &[]).unwrap();
    state.push(s_id, 0.0, &[90.0]).unwrap();
    for id in [yaw_id, f_id, pop_id, yaw_id, f_id] {
        state.push(id, 0.0, &[]).unwrap();
    }

    let list = interpreter
        .interpret_symbios(&state, &interner, &interpreter.root_state())
        .unwrap();
    let [side, sibling] = list.as_slice() else {
        panic!("expected two segments");
    };
    assert!(side.tip().abs_diff_eq(Vec3::X, 1e-5));
    let wide = Vec3::new(60f32.to_radians().sin(), 0.0, 60f32.to_radians().cos());
    assert!(sibling.tip().abs_diff_eq(wide, 1e-5));
}
