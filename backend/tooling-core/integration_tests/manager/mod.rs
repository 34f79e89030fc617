mod logs;
mod registry;
