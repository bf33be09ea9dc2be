/*!
Domain services.

Each service owns the storage handles it needs, injected at
construction, and raises typed `Error`s that the http layer
maps to responses.
*/
mod albums;
mod authentications;
mod collaborations;
mod exports;
mod playlists;
mod songs;
mod uploads;
mod users;

pub use albums::AlbumsService;
pub use authentications::AuthenticationsService;
pub use collaborations::CollaborationsService;
pub use exports::ExportsService;
pub use playlists::PlaylistsService;
pub use songs::SongsService;
pub use uploads::{UploadsService, IMAGES_PATH};
pub use users::UsersService;
