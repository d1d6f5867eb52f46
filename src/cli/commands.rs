use clap::Subcommand;

use super::candidates::CandidatesArgs;
use super::config::ConfigArgs;
use super::heal::HealArgs;
use super::history::HistoryArgs;
use super::selectors::SelectorsArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Propose replacement locators for a locator that stopped matching
    Heal(HealArgs),

    /// List every candidate for the baseline element with its score
    Candidates(CandidatesArgs),

    /// Synthesize locators for the element with a given id
    Selectors(SelectorsArgs),

    /// Inspect or edit the healing history
    History(HistoryArgs),

    /// Manage selector-heal configuration
    Config(ConfigArgs),
}
