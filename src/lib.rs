#![crate_name = "hashery"]

//! hashery is a content-addressed HTTP file server.
//! Content is addressed by _cake_: a compact base-62 identifier that packs a
//! structure and role header byte in front of either the content itself (for
//! content of 32 bytes or less) or its SHA256 digest. The identifier for the
//! same content is always the same.
//!
//! ## Addressing
//!
//! Besides plain content addressing the cake scheme carries _portal_
//! structures, which reference mutable storage, and identifiers that embed a
//! whole serialized path. See the [cake](crate::cake) module for the codec
//! and the [path](crate::path) module for path composition.
//!
//! Browser-facing routes are parsed by the [web](crate::web) module:
//! a route is the root, a `~`-prefixed settings path, or an alias path that
//! leads with either a registered alias name or, behind the `_` marker, a
//! literal cake.
//!
//! ## Directories
//!
//! A directory is a [rack](crate::rack): a sorted name-to-cake bundle with a
//! canonical JSON form, itself content-addressed with the NEURON role. Path
//! resolution walks racks segment by segment.
//!
//! ## Running the daemon
//!
//! The daemon listens on all ip addresses on port 8000 by default, and
//! stores and serves content from the current directory. See
//! `cargo run -- --help` for the options.
//!
//! ## Surface
//!
//! With a server running on `localhost:8000`, a `PUT` of content body to `/`
//! answers with the content's cake, and a `PUT` to `/myalias` additionally
//! binds the alias. `GET /info/<path>` answers path metadata as JSON and
//! `GET /data/<path>` the content itself:
//!
//! ``` ignore,
//! http://localhost:8000/data/myalias/b.txt
//! http://localhost:8000/info/_/01aMUQDApalaaYbXFjBVMMvyCAMfSPcTojI0745igi
//! ```

/// Positional base-62 codec for identifier text.
pub mod basex;

/// The cake identifier codec and its classification helpers.
pub mod cake;

/// Cake-rooted path values and composition.
pub mod path;

/// Browser route parsing into root, settings and alias paths.
pub mod web;

/// Sorted name-to-cake directory bundles.
pub mod rack;

/// Interfaces a single content record lookup.
pub mod record;

/// Encapsulates an incoming remote request.
pub mod request;

/// Encapsulates an outgoing response to remote.
pub mod response;

/// Command line argument handling for the daemon.
pub mod arg;
