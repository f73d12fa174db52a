pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod model_resolver;
    pub mod settings;
}

pub mod capture {
    pub mod domain {
        pub mod camera;
        pub mod video_sink;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod async_detector;
        pub mod detector_gate;
        pub mod expression_detector;
        pub mod face_detection;
    }
    pub mod infrastructure;
}

pub mod rendering {
    pub mod domain {
        pub mod canvas_sizer;
        pub mod drawing_surface;
        pub mod landmark_renderer;
    }
    pub mod infrastructure;
}

pub mod mood {
    pub mod domain {
        pub mod expression;
        pub mod mood;
        pub mod mood_style;
    }
}

pub mod pipeline {
    pub mod frame_pump;
    pub mod mood_filter_controller;
    pub mod pipeline_logger;
    pub mod session;
}
