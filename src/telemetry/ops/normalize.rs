use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Normalize;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Read, Normalize, Write }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Read => "read", Phase::Normalize => "normalize", Phase::Write => "write" } }
    fn span(&self) -> Span { match self { Phase::Read => info_span!("read"), Phase::Normalize => info_span!("normalize"), Phase::Write => info_span!("write") } }
}

impl OpMarker for Normalize {
    const NAME: &'static str = "normalize";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("normalize") }
}
