pub mod find_nearest;
