use std::error::Error;

use crate::network::common::interface::ScenarioMaker;
use crate::network::model::{
    dataset::Dataset,
    topology::{
        BURNING, DRUM, FUSE, MULT_PAGES, PAPER, PAPER_JAM, QUALITY, ROLLER, TONER, Topology,
        WRINKLED,
    },
};

/// Fifteen recorded printer incidents, one column per variable.
const SAMPLE_CASES: [(&str, [u8; 15]); 10] = [
    // fuse assembly malfunction
    (FUSE, [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1]),
    // drum unit
    (DRUM, [0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1, 0, 0, 0]),
    // toner out
    (TONER, [1, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 0]),
    // poor paper quality
    (PAPER, [1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 1, 1, 0, 0]),
    // worn roller
    (ROLLER, [0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 1]),
    // burning smell
    (BURNING, [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0]),
    // poor print quality
    (QUALITY, [1, 1, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0]),
    // wrinkled pages
    (WRINKLED, [0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 1]),
    // multiple pages fed
    (MULT_PAGES, [0, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1]),
    // paper jam
    (PAPER_JAM, [0, 0, 1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 0, 1, 0]),
];

/// The fixed illustrative dataset.
pub fn sample_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    for (name, cases) in SAMPLE_CASES.iter() {
        dataset.insert(name, cases.iter().map(|&flag| flag == 1).collect());
    }
    dataset
}

pub struct PrinterSample {}

impl ScenarioMaker for PrinterSample {
    fn make_dataset(
        &self,
        topology: &Topology,
    ) -> Result<Dataset, Box<dyn Error + Send + Sync>> {
        let dataset = sample_dataset();
        // fails early if the topology is not the printer network
        dataset.aligned(topology)?;
        Ok(dataset)
    }
}
