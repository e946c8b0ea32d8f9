//! Everything that goes into a provider request.
//!
//! | Piece | Module |
//! |-------|--------|
//! | System prompt from live metrics | [`prompt`] |
//! | `id-ID` number, percent and date rendering | [`locale`] |
//! | Ordered message history | [`assembler`] |
//! | `max_tokens` ceiling | [`token`] |

pub mod assembler;
pub mod locale;
pub mod prompt;
pub mod token;

pub use assembler::assemble;
pub use prompt::compose_system_prompt;
pub use token::token_limit;
