mod admin;
mod helpers;
mod lifecycle;
mod manager;
mod status;
