pub mod client;
pub mod payload;

pub use client::{RenderError, ShareCard, ShareClient};
pub use payload::{build_card_payload, mask_wallet, percentile_label, BuildError, CardInputs, CardPayload};
