//! Stage metadata catalog for host introspection.

use crate::account::{TokenAccount, TokenStamper};
use crate::charcount::CharacterCounter;
use crate::consume::DocConsumer;
use crate::currency::CurrencyConverter;
use crate::generate::{DocGenerator, SingleDocGenerator};
use crate::merge::MergeStreams;
use crate::props_demo::PropertyShowcase;
use crate::route::GenderRouter;
use crate::schema_gate::SchemaGate;
use crate::suggest_demo::EchoSuggest;
use conveyor_core::prelude::*;

/// Metadata for every stage this crate ships.
pub fn all_stages() -> Vec<StageInfo> {
    vec![
        DocGenerator::default().info(),
        SingleDocGenerator.info(),
        DocConsumer::default().info(),
        MergeStreams::default().info(),
        GenderRouter::default().info(),
        SchemaGate.info(),
        CharacterCounter::default().info(),
        CurrencyConverter::default().info(),
        PropertyShowcase::default().info(),
        EchoSuggest::default().info(),
        TokenStamper::new(TokenAccount::default()).info(),
    ]
}
