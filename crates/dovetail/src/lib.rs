//! Lexical analysis by dovetailed simulation of per-token DFAs
//!
//! Each token category is recognized by its own small [`Dfa`].  A
//! [`Tokenizer`] either steps the whole [`Catalog`] side by side, one symbol
//! per round, or folds it with [`Dfa::union`] into a single recognizer first.
//! Both strategies apply the same longest-match rule with one symbol of
//! lookahead.

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autom;
pub mod catalog;
pub mod dfa;
pub mod dot;
pub mod scanner;
pub mod source;
pub mod token;

pub use autom::{Automaton, Status};
pub use catalog::Catalog;
pub use dfa::{BuildError, Dfa, DfaBuilder, StateId};
pub use scanner::{Strategy, Tokenizer};
pub use source::{ByteSource, CharSource, StrSource};
pub use token::{Category, Position, Spanned, Token, TokenKind};
