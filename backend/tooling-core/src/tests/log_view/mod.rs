mod ansi;
mod bracketed;
mod fetcher;
mod line_filter;
mod pipeline;
mod recognizer;
