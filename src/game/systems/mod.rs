pub mod asteroids;
pub mod cargo;
pub mod collision;
pub mod combat;
pub mod economy;
pub mod physics;
pub mod powers;
pub mod projectile;
pub mod quests;
