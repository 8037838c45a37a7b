pub mod constants;
pub mod cosmetics;
pub mod events;
pub mod game_loop;
pub mod input;
pub mod loot;
pub mod powers;
pub mod quest;
pub mod state;
pub mod systems;

pub use systems::economy::ShopError;
