pub mod chain_of_thought;
