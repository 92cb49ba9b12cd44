pub mod auth;
pub mod genres;
pub mod movies;
pub mod profile;
pub mod providers;
pub mod watchlist;

pub use auth::{Authenticator, PasswordHasher, TokenIssuer};
pub use genres::GenreTable;
pub use movies::MovieService;
pub use profile::ProfileService;
pub use providers::{MovieCatalog, TmdbCatalog};
pub use watchlist::WatchlistService;
