pub mod downsample;
pub mod generate;
pub mod overlay;
pub mod split;
