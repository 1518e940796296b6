/// Per-session instrumenter state (spec §3.2): reasoning chunk
/// accumulator, its token counter, the cached model name, and the last
/// prompt hash used to link subsequent `line` annotations.
#[derive(Debug, Default)]
pub struct InstrumenterState {
    pub reasoning_buffer: String,
    pub reasoning_token_count: u64,
    pub model_name: Option<String>,
    pub last_prompt_hash: Option<String>,
}
