pub mod interface;
pub mod resources;
pub mod setup;

pub use interface::{ParameterRepository, ScenarioMaker};
pub use resources::ResourceContext;
