pub mod movie;
pub mod user;
pub mod watchlist;

pub use movie::{Movie, TmdbGenre, TmdbGenreList, TmdbPage};
pub use user::{
    AuthResponse, LoginRequest, NewUser, RegisterRequest, UpdateProfileRequest, User, UserPublic,
};
pub use watchlist::{
    Comment, CommentRequest, EntryMessage, Message, NewEntry, PageRequest, RateRequest,
    SaveMovieRequest, WatchlistEntry, WatchlistPage, WatchlistParams,
};
