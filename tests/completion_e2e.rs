use approx::assert_abs_diff_eq;
use dbnet::{
    ConditionalDistribution, Cpd, DbnConfig, DynamicBayesianNetwork, Factor, Node, Rule, RuleCpd, TabularCpd,
    TimedNode, TreeCpd, TreeNode,
};

/// Rain persists across steps; the umbrella depends on today's rain.
fn umbrella_network() -> DynamicBayesianNetwork {
    let mut dbn = DynamicBayesianNetwork::new();
    dbn.add_edges_from([(("Rain", 0), ("Umbrella", 0)), (("Rain", 0), ("Rain", 1))])
        .unwrap();
    dbn
}

fn umbrella_tree() -> TreeCpd {
    TreeCpd::new(
        Node::current("Umbrella"),
        2,
        vec![Node::current("Rain")],
        vec![2],
        TreeNode::split(
            Node::current("Rain"),
            vec![TreeNode::leaf(vec![0.8, 0.2]), TreeNode::leaf(vec![0.1, 0.9])],
        ),
    )
    .unwrap()
}

fn rain_transition() -> RuleCpd {
    RuleCpd::new(
        Node::next("Rain"),
        2,
        vec![Node::current("Rain")],
        vec![2],
        vec![
            Rule::new(vec![(Node::current("Rain"), 1)], vec![0.3, 0.7]),
            Rule::otherwise(vec![0.7, 0.3]),
        ],
    )
    .unwrap()
}

#[test]
fn tree_template_is_synthesized_as_tabular() {
    let mut dbn = umbrella_network();
    dbn.add_cpds([
        Factor::from(TabularCpd::prior(Node::current("Rain"), vec![0.5, 0.5]).unwrap()),
        Factor::from(umbrella_tree()),
        Factor::from(rain_transition()),
    ])
    .unwrap();
    dbn.check_model().unwrap();

    let synthesized = dbn.initialize_initial_state().unwrap();
    assert_eq!(synthesized, vec![Node::next("Umbrella")]);

    let umbrella1 = dbn.get_cpd(&Node::next("Umbrella")).unwrap().unwrap();
    assert!(matches!(umbrella1, Cpd::Tabular(_)));
    assert_eq!(umbrella1.evidence(), &[Node::next("Rain")]);
    assert_abs_diff_eq!(umbrella1.values()[(1, 1)], 0.9, epsilon = 1e-12);
    assert_eq!(umbrella1.values(), umbrella_tree().values());
    assert_eq!(dbn.cardinality("Umbrella"), Some(2));
}

#[test]
fn completion_matches_hand_authored_template() {
    let mut completed = umbrella_network();
    completed
        .add_cpds([
            Factor::from(TabularCpd::prior(Node::current("Rain"), vec![0.5, 0.5]).unwrap()),
            Factor::from(umbrella_tree()),
            Factor::from(rain_transition()),
        ])
        .unwrap();
    completed.initialize_initial_state().unwrap();

    let mut authored = umbrella_network();
    authored
        .add_cpds([
            Factor::from(TabularCpd::prior(Node::current("Rain"), vec![0.5, 0.5]).unwrap()),
            Factor::from(umbrella_tree()),
            Factor::from(rain_transition()),
            Factor::from(
                TabularCpd::new(
                    Node::next("Umbrella"),
                    2,
                    vec![vec![0.8, 0.1], vec![0.2, 0.9]],
                    vec![Node::next("Rain")],
                    vec![2],
                )
                .unwrap(),
            ),
        ])
        .unwrap();
    authored.check_model().unwrap();

    for (a, b) in completed.cpds().zip(authored.cpds()) {
        assert_eq!(a.variable(), b.variable());
        assert_eq!(a.evidence(), b.evidence());
        assert_eq!(a.values(), b.values());
    }
    assert_eq!(completed.cpds().count(), authored.cpds().count());
}

#[test]
fn completed_template_unrolls_to_any_slice() {
    let mut dbn = umbrella_network();
    dbn.add_cpds([
        Factor::from(TabularCpd::prior(Node::current("Rain"), vec![0.5, 0.5]).unwrap()),
        Factor::from(umbrella_tree()),
        Factor::from(rain_transition()),
    ])
    .unwrap();
    dbn.initialize_initial_state().unwrap();

    assert_eq!(
        dbn.get_intra_edges(5).unwrap(),
        vec![(TimedNode::new("Rain", 5), TimedNode::new("Umbrella", 5))]
    );
    assert_eq!(dbn.get_interface_nodes(5).unwrap(), vec![TimedNode::new("Rain", 5)]);
    assert_eq!(
        dbn.get_slice_nodes(5).unwrap(),
        vec![TimedNode::new("Rain", 5), TimedNode::new("Umbrella", 5)]
    );

    // Slice 1 now holds the synthesized umbrella CPD only: the rain transition spans both slices.
    let slice1: Vec<&Node> = dbn.get_slice_cpds(1).unwrap().into_iter().map(|c| c.variable()).collect();
    assert_eq!(slice1, vec![&Node::next("Umbrella")]);
}

#[test]
fn completion_respects_configured_tolerance() {
    let config = DbnConfig::from_json_str(r#"{"normalization_tolerance": 0.0001}"#).unwrap();
    let mut dbn = DynamicBayesianNetwork::with_config(config).unwrap();
    dbn.add_edge(("A", 0), ("B", 0)).unwrap();
    // Off by 0.001: inside the default tolerance, outside the configured one.
    dbn.add_cpd(TabularCpd::prior(Node::current("A"), vec![0.3, 0.701]).unwrap())
        .unwrap();

    let err = dbn.initialize_initial_state().unwrap_err();
    assert!(err.is_cpd());
    assert_eq!(err.node(), Some(&Node::current("A")));
}
