#[cfg(test)]
mod test_scenarios {
    use bayesdiag::network::model::{error::NetworkError, topology::Topology};
    use bayesdiag::network::scenarios::factory::ScenarioMakerFactory;
    use bayesdiag::network::scenarios::synthetic::{SyntheticPrinter, sample_cases};

    #[test]
    fn test_factory_scenarios() {
        let topology = Topology::printer();
        let printer = ScenarioMakerFactory::new_shared("printer", 2017).unwrap();
        let dataset = printer.make_dataset(&topology).unwrap();
        assert_eq!(dataset.case_count(&topology).unwrap(), 15);
        assert_eq!(
            dataset.column("Fuse").unwrap().iter().filter(|&&v| v).count(),
            3
        );

        let synthetic = ScenarioMakerFactory::new_shared("synthetic", 5).unwrap();
        let dataset = synthetic.make_dataset(&topology).unwrap();
        assert_eq!(dataset.case_count(&topology).unwrap(), 1000);

        assert!(ScenarioMakerFactory::new_shared("laser", 1).is_err());
    }

    #[test]
    fn test_synthetic_is_seeded() {
        let topology = Topology::printer();
        let params = SyntheticPrinter::default_params(&topology).unwrap();
        let a = sample_cases(&topology, &params, 50, 42).unwrap();
        let b = sample_cases(&topology, &params, 50, 42).unwrap();
        assert_eq!(a, b);
        assert!(matches!(
            sample_cases(&topology, &params, 0, 42),
            Err(NetworkError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_printer_scenario_needs_printer_topology() {
        let other = Topology::new(vec![("A", vec![]), ("B", vec!["A"])]).unwrap();
        let printer = ScenarioMakerFactory::new_shared("printer", 2017).unwrap();
        assert!(printer.make_dataset(&other).is_err());
    }
}
