
mod test_debounce_leading;
mod test_manual_clock;
