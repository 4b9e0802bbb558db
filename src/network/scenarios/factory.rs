use std::{error::Error, rc::Rc};

use crate::network::common::interface::ScenarioMaker;

use super::{printer::PrinterSample, synthetic::SyntheticPrinter};

pub struct ScenarioMakerFactory;

impl ScenarioMakerFactory {
    pub fn new_shared(
        name: &str,
        seed: u64,
    ) -> Result<Rc<dyn ScenarioMaker>, Box<dyn Error + Send + Sync>> {
        match name {
            "printer" => Ok(Rc::new(PrinterSample {})),
            "synthetic" => Ok(Rc::new(SyntheticPrinter {
                cases: 1000,
                seed,
                params: None,
            })),
            _ => Err(format!("Unknown scenario '{}'", name).into()),
        }
    }
}
