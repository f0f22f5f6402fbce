use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Scrape;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Launch, Listing, Close, Normalize, Write }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Launch => "launch",
        Phase::Listing => "listing",
        Phase::Close => "close",
        Phase::Normalize => "normalize",
        Phase::Write => "write",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Launch => info_span!("launch"),
        Phase::Listing => info_span!("listing"),
        Phase::Close => info_span!("close"),
        Phase::Normalize => info_span!("normalize"),
        Phase::Write => info_span!("write"),
    }}
}

impl OpMarker for Scrape {
    const NAME: &'static str = "scrape";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("scrape") }
}
