use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AlbumStore, CollaborationStore, PlaylistStore, SongStore, UserStore};
use crate::models::{
    ActivityEntry, Album, AlbumLike, Collaboration, Playlist, PlaylistActivity, PlaylistSong,
    PlaylistSummary, Song, SongFilter, SongSummary, User,
};
use crate::Result;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "
            insert into users (id, username, password, fullname)
            values ($1, $2, $3, $4)
            ",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.fullname)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>("select * from users where id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("select * from users where username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_refresh_token(&self, token: &str) -> Result<()> {
        sqlx::query("insert into authentications (token) values ($1)")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn refresh_token_exists(&self, token: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("select exists(select 1 from authentications where token = $1)")
                .bind(token)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool> {
        let res = sqlx::query("delete from authentications where token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl AlbumStore for PgStore {
    async fn insert_album(&self, album: &Album) -> Result<()> {
        sqlx::query(
            "
            insert into albums (id, name, year, cover, created_at, updated_at)
            values ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&album.id)
        .bind(&album.name)
        .bind(album.year)
        .bind(&album.cover)
        .bind(album.created_at)
        .bind(album.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_album(&self, id: &str) -> Result<Option<Album>> {
        Ok(sqlx::query_as::<_, Album>("select * from albums where id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_albums(&self) -> Result<Vec<Album>> {
        Ok(
            sqlx::query_as::<_, Album>("select * from albums order by created_at, id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn update_album(
        &self,
        id: &str,
        name: &str,
        year: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let res = sqlx::query(
            "
            update albums set name = $1, year = $2, updated_at = $3
            where id = $4
            ",
        )
        .bind(name)
        .bind(year)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn update_album_cover(
        &self,
        id: &str,
        cover: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let res = sqlx::query("update albums set cover = $1, updated_at = $2 where id = $3")
            .bind(cover)
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_album(&self, id: &str) -> Result<bool> {
        let res = sqlx::query("delete from albums where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn album_songs(&self, album_id: &str) -> Result<Vec<SongSummary>> {
        Ok(sqlx::query_as::<_, SongSummary>(
            "
            select id, title, performer
            from songs
            where album_id = $1
            order by created_at, id
            ",
        )
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_like(&self, like: &AlbumLike) -> Result<()> {
        sqlx::query("insert into user_album_likes (id, user_id, album_id) values ($1, $2, $3)")
            .bind(&like.id)
            .bind(&like.user_id)
            .bind(&like.album_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn like_exists(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "
            select exists(
                select 1 from user_album_likes where album_id = $1 and user_id = $2
            )
            ",
        )
        .bind(album_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn delete_like(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let res = sqlx::query("delete from user_album_likes where album_id = $1 and user_id = $2")
            .bind(album_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_likes(&self, album_id: &str) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("select count(*) from user_album_likes where album_id = $1")
                .bind(album_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl SongStore for PgStore {
    async fn insert_song(&self, song: &Song) -> Result<()> {
        sqlx::query(
            "
            insert into songs
            (id, title, year, performer, genre, duration, album_id, created_at, updated_at)
            values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(&song.id)
        .bind(&song.title)
        .bind(song.year)
        .bind(&song.performer)
        .bind(&song.genre)
        .bind(song.duration)
        .bind(&song.album_id)
        .bind(song.created_at)
        .bind(song.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_song(&self, id: &str) -> Result<Option<Song>> {
        Ok(sqlx::query_as::<_, Song>("select * from songs where id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn search_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        Ok(sqlx::query_as::<_, SongSummary>(
            "
            select id, title, performer
            from songs
            where ($1::text is null or title ilike '%' || $1 || '%')
                and ($2::text is null or performer ilike '%' || $2 || '%')
            order by created_at, id
            ",
        )
        .bind(&filter.title)
        .bind(&filter.performer)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_song(&self, song: &Song) -> Result<bool> {
        let res = sqlx::query(
            "
            update songs set
                title = $1, year = $2, performer = $3, genre = $4,
                duration = $5, album_id = $6, updated_at = $7
            where id = $8
            ",
        )
        .bind(&song.title)
        .bind(song.year)
        .bind(&song.performer)
        .bind(&song.genre)
        .bind(song.duration)
        .bind(&song.album_id)
        .bind(song.updated_at)
        .bind(&song.id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_song(&self, id: &str) -> Result<bool> {
        let res = sqlx::query("delete from songs where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl PlaylistStore for PgStore {
    async fn insert_playlist(&self, playlist: &Playlist) -> Result<()> {
        sqlx::query("insert into playlists (id, name, owner) values ($1, $2, $3)")
            .bind(&playlist.id)
            .bind(&playlist.name)
            .bind(&playlist.owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_playlist(&self, id: &str) -> Result<Option<Playlist>> {
        Ok(
            sqlx::query_as::<_, Playlist>("select id, name, owner from playlists where id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn playlists_for_user(&self, user_id: &str) -> Result<Vec<PlaylistSummary>> {
        Ok(sqlx::query_as::<_, PlaylistSummary>(
            "
            select distinct p.id, p.name, u.username
            from playlists p
                left join users u on u.id = p.owner
                left join collaborations c on c.playlist_id = p.id
            where p.owner = $1 or c.user_id = $1
            order by p.name, p.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_playlist(&self, id: &str) -> Result<bool> {
        let res = sqlx::query("delete from playlists where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn playlist_owner_username(&self, playlist_id: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "
            select u.username
            from users u inner join playlists p on u.id = p.owner
            where p.id = $1
            ",
        )
        .bind(playlist_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(username,)| username))
    }

    async fn insert_playlist_song(&self, entry: &PlaylistSong) -> Result<()> {
        sqlx::query("insert into playlist_songs (id, playlist_id, song_id) values ($1, $2, $3)")
            .bind(&entry.id)
            .bind(&entry.playlist_id)
            .bind(&entry.song_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<bool> {
        let res = sqlx::query("delete from playlist_songs where playlist_id = $1 and song_id = $2")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn playlist_songs(&self, playlist_id: &str) -> Result<Vec<SongSummary>> {
        Ok(sqlx::query_as::<_, SongSummary>(
            "
            select s.id, s.title, s.performer
            from songs s inner join playlist_songs ps on s.id = ps.song_id
            where ps.playlist_id = $1
            order by ps.seq
            ",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_activity(&self, activity: &PlaylistActivity) -> Result<()> {
        sqlx::query(
            "
            insert into playlist_song_activities
            (id, playlist_id, song_id, user_id, action, time)
            values ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&activity.id)
        .bind(&activity.playlist_id)
        .bind(&activity.song_id)
        .bind(&activity.user_id)
        .bind(&activity.action)
        .bind(activity.time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn playlist_activities(&self, playlist_id: &str) -> Result<Vec<ActivityEntry>> {
        Ok(sqlx::query_as::<_, ActivityEntry>(
            "
            select u.username, s.title, a.action, a.time
            from playlist_song_activities a
                left join songs s on s.id = a.song_id
                left join users u on u.id = a.user_id
            where a.playlist_id = $1
            order by a.time, a.id
            ",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait::async_trait]
impl CollaborationStore for PgStore {
    async fn insert_collaboration(&self, collaboration: &Collaboration) -> Result<()> {
        sqlx::query("insert into collaborations (id, playlist_id, user_id) values ($1, $2, $3)")
            .bind(&collaboration.id)
            .bind(&collaboration.playlist_id)
            .bind(&collaboration.user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_collaboration(&self, playlist_id: &str, user_id: &str) -> Result<bool> {
        let res = sqlx::query("delete from collaborations where playlist_id = $1 and user_id = $2")
            .bind(playlist_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn collaboration_exists(&self, playlist_id: &str, user_id: &str) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "
            select exists(
                select 1 from collaborations where playlist_id = $1 and user_id = $2
            )
            ",
        )
        .bind(playlist_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
