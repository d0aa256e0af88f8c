use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the OpenMensa feed for one canteen.
    Feed(FeedArgs),
    /// List every registered canteen.
    Canteens(CanteensArgs),
    /// Resolve and print a city's legend tables.
    Legend(LegendArgs),
}

#[derive(Debug, Args)]
pub struct FeedArgs {
    /// City the canteen is registered under (e.g. "braunschweig").
    #[arg(long)]
    pub city: String,

    /// Canteen key within the city (e.g. "mensa1-mittag").
    #[arg(long)]
    pub canteen: String,

    /// Restrict the feed to the current week page.
    #[arg(long)]
    pub today: bool,

    /// Output file for the feed XML (stdout when omitted).
    #[arg(long)]
    pub out: Option<String>,

    /// Canteen page URL override (mirrors, testing).
    #[arg(long)]
    pub url: Option<String>,

    /// Legend page URL override.
    #[arg(long)]
    pub legend_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct CanteensArgs {
    /// Emit the listing as JSON instead of tab-separated text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LegendArgs {
    /// City whose legend page to resolve.
    #[arg(long)]
    pub city: String,
}
