mod encoding;
mod decoding;
mod test_case_vectors;
