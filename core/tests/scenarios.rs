//! End-to-end scenarios exercising the public pipeline (window -> simulate
//! -> dependency -> decompose -> database -> driver) against small,
//! hand-checkable networks.

use rinox_core::chain::bound_chain::{Chain, ChainGate, Literal};
use rinox_core::chain::{extract, insert, BoundChain};
use rinox_core::config::ResynthesisConfig;
use rinox_core::database::MappedDatabase;
use rinox_core::driver::Driver;
use rinox_core::library::{AugmentedLibrary, GateFunction, GateId, InnerChain, LibraryGate, Pin, Primitive};
use rinox_core::network::{BoundNetwork, Signal};
use rinox_core::profiler::{AreaProfiler, PowerProfiler, Profiler};
use rinox_core::window::{WindowManager, WindowSimulator};
use rinox_truth::TruthTable;
use rinox_util::diagnostics::NullDiagnostics;

fn pin(delay: f64, cap: f64) -> Pin {
    Pin { name: "a".into(), rise_delay: delay, fall_delay: delay, rise_capacitance: cap, fall_capacitance: cap }
}

fn and2_inner() -> InnerChain {
    InnerChain::new(
        2,
        vec![ChainGate { fanins: vec![Literal(0), Literal(1)], binding: Primitive::And { neg_a: false, neg_b: false } }],
        vec![Literal(2)],
    )
}

fn xor2_inner() -> InnerChain {
    InnerChain::new(2, vec![ChainGate { fanins: vec![Literal(0), Literal(1)], binding: Primitive::Xor }], vec![Literal(2)])
}

fn inv_inner() -> InnerChain {
    InnerChain::new(
        1,
        vec![ChainGate { fanins: vec![Literal(0), Literal(0)], binding: Primitive::And { neg_a: true, neg_b: true } }],
        vec![Literal(1)],
    )
}

/// and3 built from two AND primitives: a known-arity tree, not a primitive.
fn and3_inner() -> InnerChain {
    InnerChain::new(
        3,
        vec![
            ChainGate { fanins: vec![Literal(0), Literal(1)], binding: Primitive::And { neg_a: false, neg_b: false } },
            ChainGate { fanins: vec![Literal(3), Literal(2)], binding: Primitive::And { neg_a: false, neg_b: false } },
        ],
        vec![Literal(4)],
    )
}

fn xor3_inner() -> InnerChain {
    InnerChain::new(
        3,
        vec![
            ChainGate { fanins: vec![Literal(0), Literal(1)], binding: Primitive::Xor },
            ChainGate { fanins: vec![Literal(3), Literal(2)], binding: Primitive::Xor },
        ],
        vec![Literal(4)],
    )
}

/// Registers and2/xor2/inv/and3/xor3, each with uniform 1.0-delay,
/// 0.1-capacitance pins, returning their gate ids in that order.
fn full_library() -> (AugmentedLibrary, GateId, GateId, GateId, GateId, GateId) {
    let mut lib = AugmentedLibrary::new();

    let and2_fn = GateFunction::nth_var(2, 0).bit_and(&GateFunction::nth_var(2, 1));
    let and2 = lib.add_gate(LibraryGate::new("and2", 1.0, 2, and2_fn, vec![pin(1.0, 0.1), pin(1.0, 0.1)]), and2_inner());

    let xor2_fn = GateFunction::nth_var(2, 0).bit_xor(&GateFunction::nth_var(2, 1));
    let xor2 = lib.add_gate(LibraryGate::new("xor2", 1.0, 2, xor2_fn, vec![pin(1.0, 0.1), pin(1.0, 0.1)]), xor2_inner());

    let inv_fn = GateFunction::nth_var(1, 0).bit_not();
    let inv = lib.add_gate(LibraryGate::new("inv", 0.5, 1, inv_fn, vec![pin(1.0, 0.1)]), inv_inner());

    let and3_fn = GateFunction::nth_var(3, 0).bit_and(&GateFunction::nth_var(3, 1)).bit_and(&GateFunction::nth_var(3, 2));
    let and3 = lib.add_gate(LibraryGate::new("and3", 1.2, 3, and3_fn, vec![pin(1.0, 0.1), pin(1.0, 0.1), pin(1.0, 0.1)]), and3_inner());

    let xor3_fn = GateFunction::nth_var(3, 0).bit_xor(&GateFunction::nth_var(3, 1)).bit_xor(&GateFunction::nth_var(3, 2));
    let xor3 = lib.add_gate(LibraryGate::new("xor3", 1.0, 3, xor3_fn, vec![pin(1.0, 0.1), pin(1.0, 0.1), pin(1.0, 0.1)]), xor3_inner());

    (lib, and2, xor2, inv, and3, xor3)
}

/// A constant feeding an AND gate round-trips through extract/insert
/// without changing the gate's behavior: the constant leaf is carried as an
/// ordinary opaque input, never folded away by either step.
#[test]
fn extracting_and_reinserting_a_constant_fed_gate_preserves_its_function() {
    let (lib, and2, ..) = full_library();
    let diag = NullDiagnostics;
    let mut ntk = BoundNetwork::new();
    let a = ntk.create_pi();
    let one = ntk.get_constant(true);
    let g = ntk.create_node(vec![a, one], vec![and2], &lib, &diag);
    let po = ntk.create_po(g);

    let (chain, leaves) = extract(&ntk, &[a, one], g).expect("extraction should succeed");
    assert_eq!(leaves, vec![a, one]);
    assert_eq!(chain.num_gates(), 1);

    let rebuilt = insert(&mut ntk, &leaves, &chain, &lib, &diag);
    ntk.substitute_node(g.node(), &[rebuilt]);

    // Re-extract from the PO's new driver and confirm the function is still
    // plain AND(a, const1), i.e. a itself: the constant was never folded.
    let driver = ntk.po_driver(po);
    let (final_chain, final_leaves) = extract(&ntk, &[a, one], driver).unwrap();
    let inputs = vec![GateFunction::nth_var(2, 0), GateFunction::nth_var(2, 1)];
    let values = rinox_core::sim::simulate_bound_chain(&final_chain, &inputs, &lib);
    let result = values[final_chain.outputs()[0].0].clone();
    assert_eq!(final_leaves, vec![a, one]);
    assert_eq!(result, GateFunction::nth_var(2, 0));
}

/// Two fanout-free AND2 gates chained together (a&b, then &c) collapse to a
/// single database-provided and3 gate once the driver finds the full
/// 3-leaf structural cut.
#[test]
fn area_pass_collapses_a_two_gate_and_chain_into_one_and3_gate() {
    let (lib, and2, _xor2, _inv, and3, _xor3) = full_library();
    let diag = NullDiagnostics;

    let and3_chain = Chain::new(3, vec![ChainGate { fanins: vec![Literal(0), Literal(1), Literal(2)], binding: and3 }], vec![Literal(3)]);
    let mut db = MappedDatabase::new(lib.clone());
    assert!(db.add(&and3_chain, &diag));

    let mut ntk = BoundNetwork::new();
    let a = ntk.create_pi();
    let b = ntk.create_pi();
    let c = ntk.create_pi();
    let g1 = ntk.create_node(vec![a, b], vec![and2], &lib, &diag);
    let g2 = ntk.create_node(vec![g1, c], vec![and2], &lib, &diag);
    let po = ntk.create_po(g2);

    let mut config = ResynthesisConfig::default();
    config.try_rewire = false;
    let mut driver = Driver::new(&config, &mut db, &lib);
    let stats = driver.run_pass::<AreaProfiler>(&mut ntk, &diag);

    assert_eq!(stats.substitutions, 1);
    assert_eq!(ntk.num_gates(), 1);
    assert!(ntk.is_dead(g1.node()));
    assert!(ntk.is_dead(g2.node()));

    let driver_sig = ntk.po_driver(po);
    assert_eq!(ntk.fanin_size(driver_sig.node()), 3);
    let inputs = vec![GateFunction::nth_var(3, 0), GateFunction::nth_var(3, 1), GateFunction::nth_var(3, 2)];
    let (chain, leaves) = extract(&ntk, &[a, b, c], driver_sig).unwrap();
    assert_eq!(leaves, vec![a, b, c]);
    let values = rinox_core::sim::simulate_bound_chain(&chain, &inputs, &lib);
    let expected = GateFunction::nth_var(3, 0).bit_and(&GateFunction::nth_var(3, 1)).bit_and(&GateFunction::nth_var(3, 2));
    assert_eq!(values[chain.outputs()[0].0], expected);
}

/// Two independent, single-output gates (an xor2 and an and2) are each
/// substituted by one pin of a shared multi-output "ha" cell, exercising
/// `Binding::Multi` and per-pin fanout independently of the driver (which
/// only ever substitutes a single-output pivot).
#[test]
fn two_single_output_gates_are_replaced_by_one_multi_output_cell() {
    let (lib, _and2, xor2, _inv, _and3, _xor3) = full_library();
    let mut ha_lib = lib.clone();
    let sum_fn = GateFunction::nth_var(2, 0).bit_xor(&GateFunction::nth_var(2, 1));
    let carry_fn = GateFunction::nth_var(2, 0).bit_and(&GateFunction::nth_var(2, 1));
    let mut sum_gate = LibraryGate::new("ha_sum", 1.5, 2, sum_fn, vec![pin(1.0, 0.1), pin(1.0, 0.1)]);
    sum_gate.cell_name = "ha".into();
    let mut carry_gate = LibraryGate::new("ha_carry", 1.5, 2, carry_fn, vec![pin(1.0, 0.1), pin(1.0, 0.1)]);
    carry_gate.cell_name = "ha".into();
    let ha_sum = ha_lib.add_gate(sum_gate, xor2_inner());
    let ha_carry = ha_lib.add_gate(carry_gate, and2_inner());
    assert_eq!(ha_lib.gates_of_cell("ha").collect::<Vec<_>>(), vec![ha_sum, ha_carry]);

    let diag = NullDiagnostics;
    let mut ntk = BoundNetwork::new();
    let a = ntk.create_pi();
    let b = ntk.create_pi();
    let sum_node = ntk.create_node(vec![a, b], vec![xor2], &ha_lib, &diag);
    let carry_node = ntk.create_node(vec![a, b], vec![_and2], &ha_lib, &diag);
    let sum_po = ntk.create_po(sum_node);
    let carry_po = ntk.create_po(carry_node);

    let ha_sig = ntk.create_node(vec![a, b], vec![ha_sum, ha_carry], &ha_lib, &diag);
    assert_eq!(ntk.fanin_size(ha_sig.node()), 2);
    assert_eq!(ntk.num_output_pins(ha_sig.node()), 2);

    let ha_sum_sig = Signal::new(ha_sig.node(), 0);
    let ha_carry_sig = Signal::new(ha_sig.node(), 1);
    ntk.substitute_node(sum_node.node(), &[ha_sum_sig]);
    ntk.substitute_node(carry_node.node(), &[ha_carry_sig]);

    assert!(ntk.is_dead(sum_node.node()));
    assert!(ntk.is_dead(carry_node.node()));
    assert_eq!(ntk.po_driver(sum_po), ha_sum_sig);
    assert_eq!(ntk.po_driver(carry_po), ha_carry_sig);
    assert_eq!(ntk.fanout_size(ha_sig.node(), 0), 1);
    assert_eq!(ntk.fanout_size(ha_sig.node(), 1), 1);
}

/// A pivot with two downstream POs, windowed with enough ODC levels to
/// reach both, picks up both POs as outputs and both of the pivot's
/// non-shared consumers' other fanins as divisors.
#[test]
fn window_with_odc_reaches_both_downstream_pos() {
    let (lib, and2, _xor2, _inv, _and3, _xor3) = full_library();
    let or2_fn = GateFunction::nth_var(2, 0).bit_or(&GateFunction::nth_var(2, 1));
    let or2_inner = InnerChain::new(
        2,
        vec![
            ChainGate { fanins: vec![Literal(0), Literal(1)], binding: Primitive::And { neg_a: true, neg_b: true } },
            ChainGate { fanins: vec![Literal(2), Literal(2)], binding: Primitive::And { neg_a: true, neg_b: true } },
        ],
        vec![Literal(3)],
    );
    let mut lib = lib;
    let or2 = lib.add_gate(LibraryGate::new("or2", 1.0, 2, or2_fn, vec![pin(1.0, 0.1), pin(1.0, 0.1)]), or2_inner);

    let diag = NullDiagnostics;
    let mut ntk = BoundNetwork::new();
    let x = ntk.create_pi();
    let y = ntk.create_pi();
    let z = ntk.create_pi();
    let w = ntk.create_pi();
    let g = ntk.create_node(vec![x, y], vec![and2], &lib, &diag);
    let h1 = ntk.create_node(vec![g, z], vec![and2], &lib, &diag);
    let h2 = ntk.create_node(vec![g, w], vec![or2], &lib, &diag);
    let po1 = ntk.create_po(h1);
    let po2 = ntk.create_po(h2);

    let mut config = ResynthesisConfig::default();
    config.odc_levels = 3;
    let mut wm = WindowManager::new();
    let window = wm.run(g.node(), &ntk, &config);

    assert_eq!(window.mffc, vec![g.node()]);
    assert_eq!(window.inputs, vec![x, y, z, w]);
    assert_eq!(window.divisors, vec![x, y, z, w]);
    assert_eq!(window.outputs, vec![Signal::new(po1, 0), Signal::new(po2, 0)]);
    assert!(window.valid(&config));

    let sim = WindowSimulator::new().run(&window, &ntk, &lib);
    let (vx, vy, vz, vw) = (GateFunction::nth_var(4, 0), GateFunction::nth_var(4, 1), GateFunction::nth_var(4, 2), GateFunction::nth_var(4, 3));
    let expected_h1 = vx.bit_and(&vy).bit_and(&vz);
    let expected_h2 = vx.bit_and(&vy).bit_or(&vw);
    assert_eq!(sim.output_values, vec![expected_h1, expected_h2]);

    // g's own fanout drives two diverging paths: h1 observes g only when
    // z=1, h2 only when w=0, so the combined care mask is exactly z | !w.
    let expected_care = vz.bit_or(&vw.bit_not());
    assert_eq!(sim.care, expected_care);
}

/// Three chains realizing the same 2-input AND with different area/delay
/// tradeoffs: the dominated (slowest and biggest) one never makes it into
/// the row, and the surviving two round-trip through JSON unchanged.
#[test]
fn database_keeps_only_pareto_optimal_entries_and_round_trips_through_json() {
    let mut lib = AugmentedLibrary::new();
    let and2_fn = GateFunction::nth_var(2, 0).bit_and(&GateFunction::nth_var(2, 1));
    let fast = lib.add_gate(LibraryGate::new("and2_fast", 2.0, 2, and2_fn.clone(), vec![pin(0.5, 0.1), pin(0.5, 0.1)]), and2_inner());
    let small = lib.add_gate(LibraryGate::new("and2_small", 1.0, 2, and2_fn.clone(), vec![pin(2.0, 0.1), pin(2.0, 0.1)]), and2_inner());
    let big = lib.add_gate(LibraryGate::new("and2_big", 3.0, 2, and2_fn, vec![pin(3.0, 0.1), pin(3.0, 0.1)]), and2_inner());

    let chain_of = |id: GateId| Chain::new(2, vec![ChainGate { fanins: vec![Literal(0), Literal(1)], binding: id }], vec![Literal(2)]);

    let diag = NullDiagnostics;
    let mut db = MappedDatabase::new(lib.clone());
    assert!(db.add(&chain_of(fast), &diag));
    assert!(db.add(&chain_of(small), &diag));
    assert!(!db.add(&chain_of(big), &diag), "and2_big is dominated by and2_fast on every metric");

    assert_eq!(db.num_rows(), 1);
    let mut areas: Vec<f64> = db.row(0).entries.iter().map(|e| e.area).collect();
    areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(areas, vec![1.0, 2.0]);

    let json = db.to_json().expect("serialization should succeed");
    let reloaded = MappedDatabase::from_json_str(&json, lib, &diag).expect("reload should succeed");
    assert_eq!(reloaded.num_rows(), 1);
    let mut reloaded_areas: Vec<f64> = reloaded.row(0).entries.iter().map(|e| e.area).collect();
    reloaded_areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(reloaded_areas, vec![1.0, 2.0]);
}

/// The power profiler charges a node its full switching count only while
/// its transition window can actually glitch (arrival strictly past
/// sensing); balancing the two inputs' arrival removes the glitch and
/// halves that node's own contribution, which shows up as an exactly
/// reproducible difference in `evaluate`'s overall reward.
#[test]
fn power_profiler_rewards_less_when_the_replaced_node_does_not_glitch() {
    let (lib, _and2, xor2, inv, _and3, xor3) = full_library();
    let diag = NullDiagnostics;

    let mut ntk = BoundNetwork::new();
    let a = ntk.create_pi();
    let b = ntk.create_pi();
    let c = ntk.create_pi();
    let t1 = ntk.create_node(vec![a, b], vec![xor2], &lib, &diag);
    let t2 = ntk.create_node(vec![t1, c], vec![xor2], &lib, &diag);
    let t3 = ntk.create_node(vec![t2], vec![inv], &lib, &diag);
    ntk.create_po(t3);

    let mut wm = WindowManager::new();

    let glitchy_config = ResynthesisConfig { input_arrivals: vec![0.0, 0.0, 0.0], ..ResynthesisConfig::default() };
    let window = wm.run(t2.node(), &ntk, &glitchy_config);
    let sim = WindowSimulator::new().run(&window, &ntk, &lib);

    let mut glitchy = PowerProfiler::default();
    glitchy.init(&window, &sim, &ntk, &lib, &glitchy_config);

    // c's arrival matches t1's own computed arrival (1.0), so t2's two
    // paths settle simultaneously and its transition window collapses.
    let balanced_config = ResynthesisConfig { input_arrivals: vec![0.0, 0.0, 1.0], ..ResynthesisConfig::default() };
    let mut balanced = PowerProfiler::default();
    balanced.init(&window, &sim, &ntk, &lib, &balanced_config);

    let xor3_chain = Chain::new(3, vec![ChainGate { fanins: vec![Literal(0), Literal(1), Literal(2)], binding: xor3 }], vec![Literal(3)]);
    let leaves = window.inputs.clone();

    let gain_glitchy = glitchy.evaluate(&xor3_chain, &leaves, &ntk, &lib);
    let gain_balanced = balanced.evaluate(&xor3_chain, &leaves, &ntk, &lib);

    assert!(gain_glitchy > gain_balanced);
    assert!((gain_glitchy - gain_balanced - 0.8).abs() < 1e-9);
}
