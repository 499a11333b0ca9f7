use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use route_engine::config::load_router;
use route_engine::http::response::describe_route;
use route_engine::routing::{MatchRequest, RouteLookup};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect and test a route table", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered routes
    List,
    /// Resolve a request against the route table
    Match {
        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(short, long)]
        path: String,

        #[arg(long, default_value = "")]
        host: String,

        #[arg(long)]
        secure: bool,
    },
    /// Show the compiled expressions of every route
    Compile,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (_, router) = load_router(&cli.config)?;

    match cli.command {
        Commands::List => {
            for route in router.routes().routes() {
                let methods: Vec<_> = route.methods().iter().map(Method::as_str).collect();
                println!(
                    "{:<24} {:<28} {:<24} {:<20} {}{}",
                    methods.join("|"),
                    route.uri(),
                    route.domain().unwrap_or("*"),
                    route.route_name().unwrap_or("-"),
                    route.action().unwrap_or("-"),
                    if route.is_fallback() { " (fallback)" } else { "" },
                );
            }
        }
        Commands::Match {
            method,
            path,
            host,
            secure,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let request = MatchRequest::new(method, &path)
                .with_host(&host)
                .with_secure(secure);

            let output = match router.dispatch(&request)? {
                RouteLookup::Matched(bound) => json!({
                    "outcome": "matched",
                    "route": describe_route(&bound),
                }),
                RouteLookup::Options { allowed } => json!({
                    "outcome": "options",
                    "allow": allowed.header_value(),
                }),
                RouteLookup::MethodNotAllowed { allowed } => json!({
                    "outcome": "method_not_allowed",
                    "allow": allowed.header_value(),
                }),
                RouteLookup::NotFound => json!({ "outcome": "not_found" }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Compile => {
            let mut compiled_routes: Vec<Value> = Vec::new();
            for route in router.routes().routes() {
                let compiled = route.compile()?;
                compiled_routes.push(json!({
                    "uri": route.uri(),
                    "static_prefix": compiled.static_prefix(),
                    "regex": compiled.regex().as_str(),
                    "host_regex": compiled.host_regex().map(|r| r.as_str()),
                    "variables": compiled.variables(),
                }));
            }
            println!("{}", serde_json::to_string_pretty(&compiled_routes)?);
        }
    }

    Ok(())
}
