pub mod assemble;
pub mod config;
pub mod prompts;
pub mod sample;

pub use assemble::{EditsRecord, TaskAssembler, TaskPair};
pub use config::TaskConfig;
pub use prompts::{PromptPool, pick_prompt};
pub use sample::{PairSampler, StringPair, build_charset};
