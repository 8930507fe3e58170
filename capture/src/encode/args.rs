use api::request::{Codec, EncodeRequest};

/// Shared head of every invocation: numbered PNG input, full-range RGB
/// converted to limited-range BT.709, and a fast-start MP4.
fn preamble(req: &EncodeRequest, input: &str) -> Vec<String> {
    let fps = req.fps.to_string();
    [
        "-y",
        "-framerate",
        fps.as_str(),
        "-start_number",
        "0",
        "-i",
        input,
        "-vf",
        "scale=in_range=full:out_range=tv:out_color_matrix=bt709",
        "-color_range",
        "tv",
        "-colorspace",
        "bt709",
        "-color_primaries",
        "bt709",
        "-color_trc",
        "bt709",
        "-movflags",
        "+faststart",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn build(req: &EncodeRequest, input: &str, output: &str) -> Vec<String> {
    let mut args = preamble(req, input);
    let crf = req.crf.to_string();
    match req.codec {
        Codec::Hevc10 => args.extend(
            [
                "-c:v",
                "libx265",
                "-pix_fmt",
                "yuv420p10le",
                "-profile:v",
                "main10",
                "-crf",
                crf.as_str(),
                "-preset",
                req.preset.as_str(),
                // QuickTime and Safari only play HEVC in MP4 when tagged hvc1
                "-tag:v",
                "hvc1",
                // must agree with the container tags above
                "-x265-params",
                "colorprim=bt709:transfer=bt709:colormatrix=bt709:range=limited",
            ]
            .map(String::from),
        ),
        Codec::H264 => args.extend(
            [
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-crf",
                crf.as_str(),
                "-preset",
                req.preset.as_str(),
            ]
            .map(String::from),
        ),
    }
    args.push(output.to_string());
    args
}
