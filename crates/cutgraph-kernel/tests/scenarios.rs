//! End-to-end behaviour through the manager.

use cutgraph_kernel::test_utils::{ECHO_CUT, FIXED_CUT, test_factory};
use cutgraph_kernel::{
    CutConfig, CutError, CutFactory, CutSection, Manager, SelectionStatus, ServiceRegistry,
    UserData,
};
use std::sync::Arc;
use SelectionStatus::{Accepted as A, Inapplicable as I, Rejected as R};

fn fixed(name: &str, status: SelectionStatus) -> CutSection {
    CutSection::new(name, FIXED_CUT).param("status", status.as_str())
}

fn build(config: CutConfig) -> Manager {
    let mut manager = Manager::new(test_factory());
    manager.initialize(&config).unwrap();
    manager
}

fn binary(name: &str, type_id: &str, a: &str, b: &str) -> CutSection {
    CutSection::new(name, type_id)
        .param("cut_1", a)
        .param("cut_2", b)
}

#[test]
fn constant_leaves_ignore_data() {
    let manager = build(
        CutConfig::new()
            .with(CutSection::new("yes", "cuts::accept_cut"))
            .with(CutSection::new("no", "cuts::reject_cut")),
    );
    let payloads: [UserData; 2] = [Arc::new(1_u8), Arc::new("anything")];
    for data in payloads {
        manager.set_user_data("yes", Arc::clone(&data)).unwrap();
        manager.set_user_data("no", data).unwrap();
        assert_eq!(manager.process("yes").unwrap(), A);
        assert_eq!(manager.process("no").unwrap(), R);
    }
}

#[test]
fn and_of_accept_and_reject_rejects() {
    let manager = build(
        CutConfig::new()
            .with(fixed("a", A))
            .with(fixed("b", R))
            .with(binary("both", "cuts::and_cut", "a", "b")),
    );
    assert_eq!(manager.process("both").unwrap(), R);
}

#[test]
fn and_with_an_inapplicable_child_is_inapplicable() {
    let manager = build(
        CutConfig::new()
            .with(fixed("a", I))
            .with(fixed("b", A))
            .with(binary("both", "cuts::and_cut", "a", "b")),
    );
    assert_eq!(manager.process("both").unwrap(), I);
}

#[test]
fn xor_and_exclude() {
    let manager = build(
        CutConfig::new()
            .with(fixed("a", A))
            .with(fixed("a2", A))
            .with(fixed("r", R))
            .with(binary("xor_aa", "cuts::xor_cut", "a", "a2"))
            .with(binary("xor_ar", "cuts::xor_cut", "a", "r"))
            .with(binary("excl_aa", "cuts::exclude_cut", "a", "a2"))
            .with(binary("excl_ar", "cuts::exclude_cut", "a", "r")),
    );
    assert_eq!(manager.process("xor_aa").unwrap(), R);
    assert_eq!(manager.process("xor_ar").unwrap(), A);
    assert_eq!(manager.process("excl_aa").unwrap(), R);
    assert_eq!(manager.process("excl_ar").unwrap(), A);
}

#[test]
fn unknown_cut_name() {
    let manager = build(CutConfig::new().with(fixed("a", A)));
    assert_eq!(
        manager.get_cut("nonexistent").unwrap_err(),
        CutError::UnknownCutName("nonexistent".into())
    );
}

/// `AND(OR(a, b), NOT(c))`, with the leaves driven through user data.
#[test]
fn three_level_graph() {
    let config = CutConfig::new()
        .with(CutSection::new("a", ECHO_CUT))
        .with(CutSection::new("b", ECHO_CUT))
        .with(CutSection::new("c", ECHO_CUT))
        .with(binary("a_or_b", "cuts::or_cut", "a", "b"))
        .with(CutSection::new("not_c", "cuts::not_cut").param("cut", "c"))
        .with(binary("top", "cuts::and_cut", "a_or_b", "not_c"));
    let manager = build(config);

    let cases = [
        ((R, A, R), A),
        ((R, R, R), R),
        ((A, R, A), R),
        ((A, A, R), A),
        ((I, A, R), I),
        ((A, A, I), I),
    ];
    for ((a, b, c), expected) in cases {
        for (name, status) in [("a", a), ("b", b), ("c", c)] {
            manager.set_user_data(name, Arc::new(status)).unwrap();
        }
        assert_eq!(
            manager.process("top").unwrap(),
            expected,
            "a={a} b={b} c={c}"
        );
    }

    let top = manager.get_cut("top").unwrap().summary().unwrap();
    assert_eq!(top.processed, cases.len() as u64);
    assert_eq!(top.children, ["a_or_b", "not_c"]);
}

#[test]
fn user_data_set_on_the_root_reaches_the_leaves() {
    let manager = build(
        CutConfig::new()
            .with(CutSection::new("x", ECHO_CUT))
            .with(CutSection::new("y", ECHO_CUT))
            .with(
                CutSection::new("any", "cuts::multi_or_cut").param("cuts", vec!["x", "y"]),
            ),
    );
    assert_eq!(manager.process("any").unwrap(), I);

    manager.set_user_data("any", Arc::new(A)).unwrap();
    assert_eq!(manager.process("any").unwrap(), A);
    assert_eq!(manager.process("x").unwrap(), A);

    manager.reset_user_data("any").unwrap();
    assert_eq!(manager.process("y").unwrap(), I);
}

#[test]
fn services_reach_initialize() {
    use cutgraph_kernel::{Cut, CutBase, CutDict, Params};

    #[derive(Default)]
    struct Threshold {
        base: CutBase,
        limit: Option<u32>,
    }

    impl Cut for Threshold {
        fn kind(&self) -> &'static str {
            "app::threshold"
        }
        fn base(&self) -> &CutBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut CutBase {
            &mut self.base
        }
        fn configure(
            &mut self,
            _params: &Params,
            services: &ServiceRegistry,
            _cuts: &CutDict,
        ) -> Result<(), CutError> {
            self.limit = services.get_as::<u32>("limit").copied();
            Ok(())
        }
        fn accept(&mut self, _cuts: &CutDict) -> Result<SelectionStatus, CutError> {
            let (Some(limit), Some(value)) = (self.limit, self.base.user_data_as::<u32>()) else {
                return Ok(I);
            };
            Ok(SelectionStatus::from_bool(*value < limit))
        }
    }

    let mut factory = CutFactory::new();
    factory.register_kind::<Threshold>("app::threshold").unwrap();
    let mut manager = Manager::new(factory)
        .with_services(ServiceRegistry::new().with("limit", 10_u32));
    manager
        .initialize(&CutConfig::new().with(CutSection::new("small", "app::threshold")))
        .unwrap();

    assert_eq!(manager.process("small").unwrap(), I);
    manager.set_user_data("small", Arc::new(3_u32)).unwrap();
    assert_eq!(manager.process("small").unwrap(), A);
    manager.set_user_data("small", Arc::new(30_u32)).unwrap();
    assert_eq!(manager.process("small").unwrap(), R);
}

#[test]
fn random_cut_is_reproducible_across_managers() {
    let config = CutConfig::new().with(
        CutSection::new("coin", "cuts::random_cut")
            .param("seed", 314159_i64)
            .param("accept_probability", 0.13),
    );
    let first = build(config.clone());
    let second = build(config);
    let draw = |m: &Manager| -> Vec<SelectionStatus> {
        (0..100).map(|_| m.process("coin").unwrap()).collect()
    };
    let draws = draw(&first);
    assert_eq!(draws, draw(&second));
    assert!(draws.iter().any(|s| s.is_accepted()));
    assert!(draws.iter().any(|s| s.is_rejected()));
}
