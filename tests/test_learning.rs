#[cfg(test)]
mod test_learning {
    use bayesdiag::network::inference::learner::{count_cases, learn};
    use bayesdiag::network::model::{
        beta::Beta,
        dataset::Dataset,
        error::NetworkError,
        params::{ParameterSet, ParameterStore},
        topology::Topology,
    };
    use bayesdiag::network::scenarios::printer::sample_dataset;
    use bayesdiag::network::scenarios::synthetic::{SyntheticPrinter, sample_cases};
    use bayesdiag::DiagnosisNetwork;
    use std::sync::Arc;

    fn beta(alpha: f64, beta: f64) -> Beta {
        Beta::new(alpha, beta).unwrap()
    }

    #[test]
    fn test_sample_dataset_posteriors() {
        let topology = Topology::printer();
        let posteriors = learn(&topology, &sample_dataset(), None).unwrap();
        let id = |name: &str| topology.id_of(name).unwrap();

        assert_eq!(posteriors.get(id("Fuse"), 0), beta(4.0, 13.0));
        assert_eq!(posteriors.get(id("Drum"), 0), beta(5.0, 12.0));
        assert_eq!(posteriors.get(id("Toner"), 0), beta(6.0, 11.0));
        assert_eq!(posteriors.get(id("Paper"), 0), beta(9.0, 8.0));
        assert_eq!(posteriors.get(id("Roller"), 0), beta(4.0, 13.0));

        assert_eq!(posteriors.rows(id("Burning")), &[beta(1.0, 13.0), beta(3.0, 2.0)]);
        assert_eq!(
            posteriors.rows(id("Wrinkled")),
            &[beta(2.0, 5.0), beta(3.0, 6.0), beta(2.0, 2.0), beta(2.0, 1.0)]
        );
        assert_eq!(
            posteriors.rows(id("MultPages")),
            &[beta(1.0, 6.0), beta(2.0, 2.0), beta(3.0, 6.0), beta(2.0, 1.0)]
        );
        assert_eq!(
            posteriors.rows(id("PaperJam")),
            &[beta(5.0, 7.0), beta(3.0, 1.0), beta(2.0, 2.0), beta(1.0, 2.0)]
        );
        // Quality rows 0b000 .. 0b111 over (Drum, Toner, Paper)
        assert_eq!(
            posteriors.rows(id("Quality")),
            &[
                beta(1.0, 4.0),
                beta(2.0, 5.0),
                beta(3.0, 1.0),
                beta(2.0, 1.0),
                beta(2.0, 1.0),
                beta(2.0, 1.0),
                beta(2.0, 1.0),
                beta(2.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_pseudo_count_grows_by_matching_cases() {
        let topology = Topology::printer();
        let dataset = sample_dataset();
        let priors = ParameterSet::uniform(&topology);
        let posteriors = learn(&topology, &dataset, Some(&priors)).unwrap();
        let counts = count_cases(&topology, &dataset).unwrap();

        for node in 0..topology.len() {
            let mut total = 0;
            for row in 0..topology.row_count(node) {
                let matched = counts.get(node, row).total();
                let grown = posteriors.get(node, row).pseudo_count() - priors.get(node, row).pseudo_count();
                assert_eq!(grown, matched as f64);
                total += matched;
            }
            assert_eq!(total, 15);
        }
    }

    #[test]
    fn test_unseen_rows_keep_their_prior() {
        let topology = Topology::printer();
        // every incident has Fuse = false, so Burning's Fuse = true row is never hit
        let mut dataset = sample_dataset();
        dataset.insert("Fuse", vec![false; 15]);
        let burning = topology.id_of("Burning").unwrap();
        let posteriors = learn(&topology, &dataset, None).unwrap();
        assert_eq!(posteriors.get(burning, 1), Beta::uniform());
        assert_eq!(posteriors.get(burning, 0).pseudo_count(), 17.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let topology = Topology::printer();
        let mut ragged = sample_dataset();
        ragged.insert("Roller", vec![true; 14]);
        assert!(matches!(
            learn(&topology, &ragged, None),
            Err(NetworkError::ShapeMismatch(_))
        ));

        let partial = Dataset::new().with_column("Fuse", vec![true]);
        assert!(matches!(
            learn(&topology, &partial, None),
            Err(NetworkError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_root_mean_converges_to_frequency() {
        let topology = Topology::printer();
        let truth = SyntheticPrinter::default_params(&topology).unwrap();
        let dataset = sample_cases(&topology, &truth, 20_000, 7).unwrap();
        let posteriors = learn(&topology, &dataset, None).unwrap();

        for &root in topology.roots() {
            let column = dataset.column(topology.name(root)).unwrap();
            let frequency = column.iter().filter(|&&v| v).count() as f64 / column.len() as f64;
            let mean = posteriors.get(root, 0).mean();
            assert!((mean - frequency).abs() < 1e-3);
            assert!((mean - 0.1).abs() < 0.02);
        }
        let burning = topology.id_of("Burning").unwrap();
        assert!((posteriors.get(burning, 1).mean() - 0.9).abs() < 0.05);
    }

    #[test]
    fn test_learning_twice_does_not_double_count() {
        let topology = Arc::new(Topology::printer());
        let dataset = sample_dataset();
        let mut network = DiagnosisNetwork::new(Arc::clone(&topology));
        network.learn(&dataset).unwrap();
        let first = network.snapshot();
        network.learn(&dataset).unwrap();
        let second = network.snapshot();
        assert_eq!(first.posteriors(), second.posteriors());
        assert_eq!(second.cases_observed(), 15);
    }

    #[test]
    fn test_incremental_learning_matches_pooled_data() {
        let topology = Arc::new(Topology::printer());
        let first = sample_dataset();
        let truth = SyntheticPrinter::default_params(&topology).unwrap();
        let second = sample_cases(&topology, &truth, 40, 11).unwrap();

        let mut network = DiagnosisNetwork::new(Arc::clone(&topology));
        network.learn(&first).unwrap();
        network.learn_incremental(&second).unwrap();

        let pooled = learn(&topology, &first.concat(&second), None).unwrap();
        assert_eq!(network.snapshot().posteriors(), &pooled);
        assert_eq!(network.snapshot().cases_observed(), 55);
    }

    #[test]
    fn test_store_case_count_follows_pseudo_counts() {
        let topology = Topology::printer();
        let fuse = topology.id_of("Fuse").unwrap();
        let dataset = sample_dataset();

        let first = ParameterStore::uniform(&topology).learn(&topology, &dataset).unwrap();
        let second = first.promote_posteriors().learn(&topology, &dataset).unwrap();

        let grown = second.posteriors().get(fuse, 0).pseudo_count()
            - second.priors().get(fuse, 0).pseudo_count()
            + first.posteriors().get(fuse, 0).pseudo_count()
            - first.priors().get(fuse, 0).pseudo_count();
        assert_eq!(grown, 30.0);
        assert_eq!(second.cases_observed(), 30);
        assert_eq!(second.prior_cases(), 15);
    }

    #[test]
    fn test_store_snapshot_is_untouched_by_learning() {
        let topology = Topology::printer();
        let store = ParameterStore::uniform(&topology);
        let learned = store.learn(&topology, &sample_dataset()).unwrap();
        assert_eq!(store.posteriors(), &ParameterSet::uniform(&topology));
        assert_eq!(learned.priors(), store.priors());
        assert_ne!(learned.posteriors(), store.posteriors());
    }
}
