#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Walk and render; neither may panic on any input.
    let partial = bmpinspect::InspectRequest::new(data).inspect_partial(enough::Unstoppable);
    let _ = bmpinspect::trace::Trace(&partial).to_string();

    let _ = bmpinspect::InspectRequest::new(data)
        .decode_pixels(false)
        .inspect(enough::Unstoppable);
});
