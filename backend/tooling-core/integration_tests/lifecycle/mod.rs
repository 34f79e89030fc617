mod kill;
mod start;
mod stop;
