pub mod check;
pub mod destroy;
pub mod scaffold;
pub mod up;
