//! Preset animations, keyframe interpolation, and scene transitions
//! (spec §4.2). All three return small additive states that the compositor
//! composes onto an element's static transform.
use crate::engine::easing::{ease_out_back, ease_out_bounce, ease_out_cubic, Easing};
use crate::timeline::{Animation, AnimationPreset, Keyframe, Transition, TransitionType};

/// Output of a preset animation or a keyframe evaluation: additive deltas
/// on top of the element's static transform, plus a multiplicative opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimState {
    pub opacity: f64,
    pub tx: f64,
    pub ty: f64,
    pub scale: f64,
}

impl Default for AnimState {
    fn default() -> Self {
        AnimState { opacity: 1.0, tx: 0.0, ty: 0.0, scale: 1.0 }
    }
}

/// `computeElementAnimation`: preset animation templates, spec §4.2 table.
pub fn compute_element_animation(
    anim: &Animation,
    t_local: f64,
    el_start: f64,
    el_duration: f64,
    w: f64,
    h: f64,
) -> AnimState {
    let tau = t_local - el_start;
    let tau_end = (el_start + el_duration) - t_local;
    let fade_in = anim.fade_in_duration.unwrap_or(0.5);
    let fade_out = anim.fade_out_duration.unwrap_or(0.5);

    let mut state = AnimState::default();
    use AnimationPreset::*;
    match anim.preset {
        FadeIn => {
            if tau < fade_in {
                state.opacity = tau / fade_in;
            }
        }
        FadeOut => {
            if tau_end < fade_out {
                state.opacity = tau_end / fade_out;
            }
        }
        FadeInOut => {
            if tau < fade_in {
                state.opacity = tau / fade_in;
            }
            if tau_end < fade_out {
                state.opacity = tau_end / fade_out;
            }
        }
        SlideInL | SlideInR | SlideInT | SlideInB => {
            if tau < fade_in {
                let p = ease_out_cubic((tau / fade_in).clamp(0.0, 1.0));
                let rem = 1.0 - p;
                match anim.preset {
                    SlideInL => state.tx = -w * rem,
                    SlideInR => state.tx = w * rem,
                    SlideInT => state.ty = -h * rem,
                    SlideInB => state.ty = h * rem,
                    _ => unreachable!(),
                }
                state.opacity = p;
            }
        }
        SlideOutL | SlideOutR | SlideOutT | SlideOutB => {
            if tau_end < fade_out {
                let p = ease_out_cubic((1.0 - tau_end / fade_out).clamp(0.0, 1.0));
                match anim.preset {
                    SlideOutL => state.tx = -w * p,
                    SlideOutR => state.tx = w * p,
                    SlideOutT => state.ty = -h * p,
                    SlideOutB => state.ty = h * p,
                    _ => unreachable!(),
                }
                state.opacity = 1.0 - p;
            }
        }
        ZoomIn => {
            if tau < fade_in {
                let p = ease_out_cubic((tau / fade_in).clamp(0.0, 1.0));
                state.scale = p;
                state.opacity = p;
            }
        }
        ZoomOut => {
            if tau_end < fade_out {
                let p = ease_out_cubic((tau_end / fade_out).clamp(0.0, 1.0));
                state.scale = p;
                state.opacity = p;
            }
        }
        Bounce => {
            if tau < fade_in {
                let p = ease_out_bounce((tau / fade_in).clamp(0.0, 1.0));
                state.ty = -0.3 * h * (1.0 - p);
                state.opacity = (tau / (0.3 * fade_in)).min(1.0);
            }
        }
        Pop => {
            if tau < fade_in {
                let p = ease_out_back((tau / fade_in).clamp(0.0, 1.0));
                state.scale = p;
                state.opacity = (tau / (0.3 * fade_in)).min(1.0);
            }
        }
        Shake => {
            if tau < fade_in {
                let p = (tau / fade_in).clamp(0.0, 1.0);
                state.tx = 10.0 * (1.0 - p) * (p * 24.0 * std::f64::consts::PI).sin();
            }
        }
        Typewriter => {
            state.scale = (tau / fade_in).clamp(0.0, 1.0);
        }
    }
    state.opacity = state.opacity.clamp(0.0, 1.0);
    state
}

/// Result of `computeKeyframeState`: opacity/scale default to the
/// multiplicative identity (1.0) when no keyframe defines them; offsets and
/// rotation carry an explicit override flag so the caller can tell "keyframe
/// defines 0" from "no keyframe touches this property at all".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeState {
    pub opacity: f64,
    pub scale: f64,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub rotation: Option<f64>,
}

impl Default for KeyframeState {
    fn default() -> Self {
        KeyframeState { opacity: 1.0, scale: 1.0, offset_x: None, offset_y: None, rotation: None }
    }
}

#[derive(Clone, Copy)]
enum Prop {
    Opacity,
    Scale,
    OffsetX,
    OffsetY,
    Rotation,
}

fn prop_value(kf: &Keyframe, prop: Prop) -> Option<f64> {
    match prop {
        Prop::Opacity => kf.opacity,
        Prop::Scale => kf.scale,
        Prop::OffsetX => kf.offset_x,
        Prop::OffsetY => kf.offset_y,
        Prop::Rotation => kf.rotation,
    }
}

fn prop_default(prop: Prop) -> f64 {
    match prop {
        Prop::Opacity | Prop::Scale => 1.0,
        Prop::OffsetX | Prop::OffsetY | Prop::Rotation => 0.0,
    }
}

/// Evaluates one property across the (logically) time-sorted keyframe list.
/// Does not mutate the caller's ordering; sorts a local index list instead.
fn evaluate_property(sorted: &[&Keyframe], tau: f64, prop: Prop) -> Option<f64> {
    let prev = sorted.iter().filter(|k| k.time <= tau).max_by(|a, b| a.time.total_cmp(&b.time));
    let next = sorted.iter().filter(|k| k.time > tau).min_by(|a, b| a.time.total_cmp(&b.time));

    match (prev, next) {
        (Some(p), Some(n)) => {
            let pv = prop_value(p, prop);
            let nv = prop_value(n, prop);
            if pv.is_none() && nv.is_none() {
                return None;
            }
            let from = pv.unwrap_or_else(|| prop_default(prop));
            let to = nv.unwrap_or_else(|| prop_default(prop));
            let span = n.time - p.time;
            let u = if span > 0.0 { ((tau - p.time) / span).clamp(0.0, 1.0) } else { 0.0 };
            let easing = n.easing.unwrap_or_default();
            let e = easing.apply(u);
            Some(from + (to - from) * e)
        }
        (Some(p), None) => prop_value(p, prop),
        (None, Some(n)) => prop_value(n, prop),
        (None, None) => None,
    }
}

/// `computeKeyframeState`: per-property sorted-bracket interpolation.
/// `t_local` and `el_start` are interpreted relative to each other: keyframe
/// times are relative to the element's `start`.
pub fn compute_keyframe_state(keyframes: &[Keyframe], t_local: f64, el_start: f64) -> KeyframeState {
    let tau = t_local - el_start;
    let mut sorted: Vec<&Keyframe> = keyframes.iter().collect();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let opacity = evaluate_property(&sorted, tau, Prop::Opacity).unwrap_or(1.0).clamp(0.0, 1.0);
    let scale = evaluate_property(&sorted, tau, Prop::Scale).unwrap_or(1.0);
    let offset_x = evaluate_property(&sorted, tau, Prop::OffsetX);
    let offset_y = evaluate_property(&sorted, tau, Prop::OffsetY);
    let rotation = evaluate_property(&sorted, tau, Prop::Rotation);

    KeyframeState { opacity, scale, offset_x, offset_y, rotation }
}

/// `computeSceneTransition`: active only while `s_scene < trans.duration`.
pub fn compute_scene_transition(trans: &Transition, s_scene: f64, w: f64, h: f64) -> AnimState {
    if s_scene >= trans.duration || trans.duration <= 0.0 {
        return AnimState::default();
    }
    let p = (s_scene / trans.duration).clamp(0.0, 1.0);
    let e = ease_out_cubic(p);
    let mut state = AnimState::default();
    use TransitionType::*;
    match trans.kind {
        Fade => state.opacity = p,
        SlideL => {
            state.tx = -w * (1.0 - e);
            state.opacity = 1.0;
        }
        SlideR => {
            state.tx = w * (1.0 - e);
            state.opacity = 1.0;
        }
        SlideU => {
            state.ty = -h * (1.0 - e);
            state.opacity = 1.0;
        }
        SlideD => {
            state.ty = h * (1.0 - e);
            state.opacity = 1.0;
        }
        WipeL => {
            state.opacity = e;
            state.tx = -0.1 * w * (1.0 - e);
        }
        WipeR => {
            state.opacity = e;
            state.tx = 0.1 * w * (1.0 - e);
        }
        WipeU => {
            state.opacity = e;
            state.ty = -0.1 * h * (1.0 - e);
        }
        WipeD => {
            state.opacity = e;
            state.ty = 0.1 * h * (1.0 - e);
        }
        ZoomIn => {
            state.scale = 0.5 + 0.5 * e;
            state.opacity = e;
        }
        ZoomOut => {
            state.scale = 1.5 - 0.5 * e;
            state.opacity = e;
        }
    }
    state.opacity = state.opacity.clamp(0.0, 1.0);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::AnimationPreset;

    fn kf(time: f64, opacity: Option<f64>) -> Keyframe {
        Keyframe { time, easing: Some(Easing::Linear), opacity, scale: None, offset_x: None, offset_y: None, rotation: None }
    }

    #[test]
    fn keyframe_alphas_match_literal_scenario() {
        // spec §8 scenario 4: [{time:0,opacity:0},{time:1,opacity:1,easing:linear}]
        // on a 2s element at fps=4 → alphas ~ [0,.25,.5,.75,1,1,1,1] over frames 0..8
        let keyframes = vec![kf(0.0, Some(0.0)), kf(1.0, Some(1.0))];
        let expected = [0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0];
        for (i, exp) in expected.iter().enumerate() {
            let t_local = i as f64 / 4.0;
            let state = compute_keyframe_state(&keyframes, t_local, 0.0);
            assert!((state.opacity - exp).abs() < 1e-9, "frame {i}: got {}", state.opacity);
        }
    }

    #[test]
    fn shuffled_keyframes_give_identical_state() {
        let a = vec![kf(0.0, Some(0.0)), kf(1.0, Some(1.0)), kf(0.5, Some(0.2))];
        let b = vec![kf(0.5, Some(0.2)), kf(1.0, Some(1.0)), kf(0.0, Some(0.0))];
        for t in [0.1, 0.4, 0.6, 0.9] {
            let sa = compute_keyframe_state(&a, t, 0.0);
            let sb = compute_keyframe_state(&b, t, 0.0);
            assert!((sa.opacity - sb.opacity).abs() < 1e-12);
        }
    }

    #[test]
    fn absent_offset_override_leaves_none() {
        let keyframes = vec![kf(0.0, Some(0.0)), kf(1.0, Some(1.0))];
        let state = compute_keyframe_state(&keyframes, 0.5, 0.0);
        assert_eq!(state.offset_x, None);
    }

    #[test]
    fn fade_in_preset_matches_literal_scenario() {
        // spec §8 scenario 3: fadeIn{duration=1s}, fps=10, 2s scene.
        let anim = Animation { preset: AnimationPreset::FadeIn, fade_in_duration: Some(1.0), fade_out_duration: None };
        let at_frame0 = compute_element_animation(&anim, 0.0, 0.0, 2.0, 100.0, 100.0);
        assert!(at_frame0.opacity.abs() < 1e-9);
        let at_frame5 = compute_element_animation(&anim, 0.5, 0.0, 2.0, 100.0, 100.0);
        assert!((at_frame5.opacity - 0.5).abs() < 1e-9);
        let at_frame10 = compute_element_animation(&anim, 1.0, 0.0, 2.0, 100.0, 100.0);
        assert!((at_frame10.opacity - 1.0).abs() < 1e-9);
    }
}
