//! Pure construction of the ffmpeg argument sequence.
//!
//! No network or filesystem I/O happens here; the input path is built by
//! joining the configured media directory (resolved against the working
//! directory when relative), so the exact token order can be asserted in
//! tests.

use castctl_core::LaunchSpec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Build the ffmpeg argument list for one stream.
///
/// Token order, which live ingest depends on:
/// 1. `-re` - read input at native playback rate. Without this ffmpeg
///    reads the file as fast as possible and the destination drifts away
///    from wall-clock time.
/// 2. `-stream_loop -1` when looping, before the input is named.
/// 3. `-t <secs>` when a positive duration cap is set.
/// 4. `-i <path>` - absolute path of the source inside `media_dir`.
/// 5. `-c:v copy -c:a copy` - repackage only, never re-encode.
/// 6. `-f flv` - container format the RTMP ingest expects.
/// 7. `-loglevel quiet`
/// 8. `<rtmp_url>/<stream_key>` - the destination.
pub fn launch_args(spec: &LaunchSpec, media_dir: &Path) -> Vec<OsString> {
    // A relative media dir must not leak into the child's argv; ffmpeg
    // would resolve it against its own working directory.
    let joined = media_dir.join(&spec.video);
    let input: PathBuf = std::path::absolute(&joined).unwrap_or(joined);

    let mut args: Vec<OsString> = vec!["-re".into()];

    if spec.looping {
        args.push("-stream_loop".into());
        args.push("-1".into());
    }

    if let Some(secs) = spec.duration_secs
        && secs > 0
    {
        args.push("-t".into());
        args.push(secs.to_string().into());
    }

    args.push("-i".into());
    args.push(input.into_os_string());

    args.push("-c:v".into());
    args.push("copy".into());
    args.push("-c:a".into());
    args.push("copy".into());
    args.push("-f".into());
    args.push("flv".into());
    args.push("-loglevel".into());
    args.push("quiet".into());

    args.push(format!("{}/{}", spec.rtmp_url, spec.stream_key).into());

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec(looping: bool, duration_secs: Option<u32>) -> LaunchSpec {
        LaunchSpec {
            stream_id: 1,
            video: "a.mp4".to_string(),
            rtmp_url: "rtmp://x".to_string(),
            stream_key: "key".to_string(),
            looping,
            duration_secs,
        }
    }

    fn media_dir() -> PathBuf {
        PathBuf::from("/srv/videos")
    }

    #[test]
    fn full_sequence_with_loop_and_duration() {
        let args = launch_args(&spec(true, Some(30)), &media_dir());
        let expected: Vec<OsString> = [
            "-re",
            "-stream_loop",
            "-1",
            "-t",
            "30",
            "-i",
            "/srv/videos/a.mp4",
            "-c:v",
            "copy",
            "-c:a",
            "copy",
            "-f",
            "flv",
            "-loglevel",
            "quiet",
            "rtmp://x/key",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn loop_flags_omitted_when_not_looping() {
        let args = launch_args(&spec(false, None), &media_dir());
        assert!(!args.contains(&OsString::from("-stream_loop")));
        assert_eq!(args[0], OsString::from("-re"));
        assert_eq!(args[1], OsString::from("-i"));
    }

    #[test]
    fn duration_omitted_when_unset_or_zero() {
        for duration in [None, Some(0)] {
            let args = launch_args(&spec(false, duration), &media_dir());
            assert!(!args.contains(&OsString::from("-t")));
        }
    }

    #[test]
    fn destination_is_url_slash_key() {
        let args = launch_args(&spec(false, None), &media_dir());
        assert_eq!(args.last().unwrap(), &OsString::from("rtmp://x/key"));
    }

    #[test]
    fn input_is_resolved_under_media_dir() {
        let args = launch_args(&spec(false, None), &media_dir());
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i + 1], OsString::from("/srv/videos/a.mp4"));
    }

    #[test]
    fn relative_media_dir_resolves_to_absolute_input() {
        let args = launch_args(&spec(false, None), Path::new("videos"));
        let i = args.iter().position(|a| a == "-i").unwrap();
        let input = Path::new(&args[i + 1]);
        assert!(input.is_absolute(), "input is not absolute: {input:?}");
        assert!(input.ends_with("videos/a.mp4"));
    }
}
