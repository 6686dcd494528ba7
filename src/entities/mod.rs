pub mod categories;
pub mod favor_videos;
pub mod groups;
pub mod users;
pub mod videos;

pub use categories::{Category, NewCategory, UpdateCategory};
pub use favor_videos::{FavorVideo, FavorVideoPayload};
pub use groups::{Group, GroupPayload};
pub use users::{NewUser, User};
pub use videos::{
    DashboardStats, NewVideo, NewVideoStats, UpdateVideo, UpdateVideoStats, Video, VideoStats,
    VideoWithStats, VideoWithStatsRow,
};
