use crate::capture::domain::camera::{CaptureError, MediaStream};
use crate::shared::frame::{Frame, FrameMetadata};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No stream attached.
    Empty,
    Paused,
    Playing,
    Ended,
}

/// Plays an attached [`MediaStream`] and holds the frame currently shown.
pub struct VideoSink {
    stream: Option<Box<dyn MediaStream>>,
    current: Option<Frame>,
    state: PlaybackState,
    frames_presented: usize,
}

impl VideoSink {
    pub fn new() -> Self {
        Self {
            stream: None,
            current: None,
            state: PlaybackState::Empty,
            frames_presented: 0,
        }
    }

    /// Replaces any previous stream. Playback starts paused.
    pub fn attach(&mut self, stream: Box<dyn MediaStream>) {
        self.detach();
        self.stream = Some(stream);
        self.state = PlaybackState::Paused;
    }

    pub fn detach(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        self.current = None;
        self.state = PlaybackState::Empty;
    }

    pub fn play(&mut self) -> Result<(), CaptureError> {
        match self.state {
            PlaybackState::Empty => Err(CaptureError::Stream("no stream attached".into())),
            PlaybackState::Ended => Err(CaptureError::Stream("stream has ended".into())),
            PlaybackState::Paused | PlaybackState::Playing => {
                self.state = PlaybackState::Playing;
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn is_ended(&self) -> bool {
        self.state == PlaybackState::Ended
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    /// Pulls the next frame from the stream and makes it current.
    ///
    /// Returns `None` when not playing or when the stream ends; the latter
    /// moves the sink to [`PlaybackState::Ended`] and releases the stream.
    pub fn present_next(&mut self) -> Option<Result<FrameMetadata, CaptureError>> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let stream = self.stream.as_mut()?;
        match stream.next_frame() {
            Some(Ok(frame)) => {
                let meta = frame.metadata();
                self.current = Some(frame);
                self.frames_presented += 1;
                Some(Ok(meta))
            }
            Some(Err(e)) => Some(Err(e)),
            None => {
                stream.stop();
                self.state = PlaybackState::Ended;
                None
            }
        }
    }
}

impl Default for VideoSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Stream that yields a fixed list of frames then ends.
    pub(crate) struct FakeStream {
        frames: VecDeque<Result<Frame, CaptureError>>,
        pub(crate) stopped: Arc<AtomicBool>,
    }

    impl FakeStream {
        pub(crate) fn new(frames: Vec<Result<Frame, CaptureError>>) -> Self {
            Self {
                frames: frames.into(),
                stopped: Arc::new(AtomicBool::new(false)),
            }
        }

        pub(crate) fn of_sizes(sizes: &[(u32, u32)]) -> Self {
            Self::new(
                sizes
                    .iter()
                    .enumerate()
                    .map(|(i, &(w, h))| Ok(Frame::blank(w, h, i)))
                    .collect(),
            )
        }
    }

    impl MediaStream for FakeStream {
        fn next_frame(&mut self) -> Option<Result<Frame, CaptureError>> {
            if self.stopped.load(Ordering::Relaxed) {
                return None;
            }
            self.frames.pop_front()
        }

        fn stop(&mut self) {
            self.stopped.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_new_sink_is_empty() {
        let mut sink = VideoSink::new();
        assert_eq!(sink.state(), PlaybackState::Empty);
        assert!(!sink.has_stream());
        assert!(sink.current_frame().is_none());
        assert!(sink.play().is_err());
        assert!(sink.present_next().is_none());
    }

    #[test]
    fn test_attach_starts_paused() {
        let mut sink = VideoSink::new();
        sink.attach(Box::new(FakeStream::of_sizes(&[(4, 4)])));
        assert!(sink.is_paused());
        assert!(sink.present_next().is_none());
    }

    #[test]
    fn test_present_next_updates_current_frame() {
        let mut sink = VideoSink::new();
        sink.attach(Box::new(FakeStream::of_sizes(&[(4, 2), (8, 6)])));
        sink.play().unwrap();

        let first = sink.present_next().unwrap().unwrap();
        assert_eq!((first.width, first.height), (4, 2));
        let second = sink.present_next().unwrap().unwrap();
        assert_eq!((second.width, second.height), (8, 6));
        assert_eq!(sink.current_frame().unwrap().index(), 1);
        assert_eq!(sink.frames_presented(), 2);
    }

    #[test]
    fn test_stream_end_moves_to_ended_and_stops() {
        let stream = FakeStream::of_sizes(&[(4, 4)]);
        let stopped = stream.stopped.clone();
        let mut sink = VideoSink::new();
        sink.attach(Box::new(stream));
        sink.play().unwrap();

        sink.present_next().unwrap().unwrap();
        assert!(sink.present_next().is_none());
        assert!(sink.is_ended());
        assert!(stopped.load(Ordering::Relaxed));
        assert!(sink.play().is_err());
    }

    #[test]
    fn test_paused_sink_presents_nothing() {
        let mut sink = VideoSink::new();
        sink.attach(Box::new(FakeStream::of_sizes(&[(4, 4), (4, 4)])));
        sink.play().unwrap();
        sink.present_next().unwrap().unwrap();
        sink.pause();

        assert!(sink.present_next().is_none());
        assert!(sink.is_paused());
        sink.play().unwrap();
        assert!(sink.present_next().is_some());
    }

    #[test]
    fn test_stream_error_is_surfaced() {
        let mut sink = VideoSink::new();
        sink.attach(Box::new(FakeStream::new(vec![Err(CaptureError::Stream(
            "decode".into(),
        ))])));
        sink.play().unwrap();

        let result = sink.present_next().unwrap();
        assert_eq!(result, Err(CaptureError::Stream("decode".into())));
    }

    #[test]
    fn test_detach_stops_stream() {
        let stream = FakeStream::of_sizes(&[(4, 4)]);
        let stopped = stream.stopped.clone();
        let mut sink = VideoSink::new();
        sink.attach(Box::new(stream));
        sink.detach();
        assert!(stopped.load(Ordering::Relaxed));
        assert_eq!(sink.state(), PlaybackState::Empty);
    }
}
