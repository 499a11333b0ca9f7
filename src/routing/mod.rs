//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (single-threaded):
//!     Router verb helpers / groups / AppConfig
//!     → route.rs (template, verbs, wheres, defaults)
//!     → collection.rs (index by verb, verb+domain+uri, name)
//!     → compile_all: compiler.rs → compiled.rs (cached per route)
//!
//! Dispatch (concurrent, read-only):
//!     RouteRequest (method, path, host, secure)
//!     → router.rs (dispatch)
//!     → collection.rs (candidates for verb, non-fallback first)
//!     → matcher.rs (URI, method, scheme, host validators)
//!     → binder.rs (named captures + defaults)
//!     → lookup.rs: Matched(BoundRoute) | Options | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled eagerly at load, lazily (compute-once) after edits
//! - Deterministic: registration order is the tie-break
//! - 404 and 405 are values, compile failures are errors

pub mod binder;
pub mod bound;
pub mod collection;
pub mod compiled;
pub mod compiler;
pub mod error;
pub mod group;
pub mod lookup;
pub mod matcher;
pub mod request;
pub mod route;
pub mod router;

pub use bound::BoundRoute;
pub use collection::RouteCollection;
pub use compiled::{CompiledRoute, Token};
pub use error::{RouteError, RouteResult};
pub use group::GroupAttributes;
pub use lookup::{AllowedMethods, RouteLookup, VERBS};
pub use matcher::{Validator, ValidatorChain};
pub use request::{MatchRequest, RouteRequest};
pub use route::Route;
pub use router::Router;
