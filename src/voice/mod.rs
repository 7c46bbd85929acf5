//! Voice command interpretation.

pub mod interpreter;

pub use interpreter::{
    CommandTable, VoiceAction, VoiceCommand, VoiceInterpreter, VoiceParameters,
};
