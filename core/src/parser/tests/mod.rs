mod filter_key;
