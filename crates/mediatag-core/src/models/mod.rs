pub mod asset;
pub mod tags;

pub use asset::{file_extension, file_name_from_path, MediaAsset};
pub use tags::{fold_tag, LabelSet, RankedTags, TagSet};
