mod builder;
mod properties;
