pub mod collection;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod patrol;
pub mod tile;
