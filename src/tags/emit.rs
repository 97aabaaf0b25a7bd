//! Serialising [`Tag`]s back into override-tag text.
//!
//! Everything writes into a `std::fmt::Write` sink so that `Display`, block
//! re-joining and length accounting all share one code path.

use super::{ClipShape, FontSize, Tag, Transform, names};

/// Write `\name`, then the glued value if there is one.
pub fn simple_tag<W>(sink: &mut W, name: &str, value: Option<&str>) -> Result<(), std::fmt::Error>
where
    W: std::fmt::Write,
{
    sink.write_str("\\")?;
    sink.write_str(name)?;
    if let Some(value) = value {
        sink.write_str(value)?;
    }

    Ok(())
}

/// Write `\name(arg1,arg2,...)`.
pub fn complex_tag<'args, W, I>(sink: &mut W, name: &str, args: I) -> Result<(), std::fmt::Error>
where
    W: std::fmt::Write,
    I: IntoIterator<Item = &'args str>,
{
    sink.write_str("\\")?;
    sink.write_str(name)?;
    sink.write_str("(")?;
    for (index, arg) in args.into_iter().enumerate() {
        if index > 0 {
            sink.write_str(",")?;
        }
        sink.write_str(arg)?;
    }
    sink.write_str(")")
}

fn clip_tag<W>(sink: &mut W, name: &str, shape: &ClipShape) -> Result<(), std::fmt::Error>
where
    W: std::fmt::Write,
{
    match shape {
        ClipShape::Rectangle { x1, y1, x2, y2 } => complex_tag(
            sink,
            name,
            [x1.as_str(), y1.as_str(), x2.as_str(), y2.as_str()],
        ),
        ClipShape::Vector {
            scale: Some(scale),
            commands,
        } => complex_tag(sink, name, [scale.as_str(), commands.as_str()]),
        ClipShape::Vector {
            scale: None,
            commands,
        } => complex_tag(sink, name, [commands.as_str()]),
    }
}

impl Tag {
    /// Serialise this tag, backslash included, into `sink`.
    pub fn emit<W>(&self, sink: &mut W) -> Result<(), std::fmt::Error>
    where
        W: std::fmt::Write,
    {
        match self {
            Self::A(value) => simple_tag(sink, names::A, value.as_deref()),
            Self::A1(value) => simple_tag(sink, names::A1, value.as_deref()),
            Self::A2(value) => simple_tag(sink, names::A2, value.as_deref()),
            Self::A3(value) => simple_tag(sink, names::A3, value.as_deref()),
            Self::A4(value) => simple_tag(sink, names::A4, value.as_deref()),
            Self::Alpha(value) => simple_tag(sink, names::ALPHA, value.as_deref()),
            Self::An(value) => simple_tag(sink, names::AN, value.as_deref()),
            Self::B(value) => simple_tag(sink, names::B, value.as_deref()),
            Self::Be(value) => simple_tag(sink, names::BE, value.as_deref()),
            Self::Blur(value) => simple_tag(sink, names::BLUR, value.as_deref()),
            Self::Bord(value) => simple_tag(sink, names::BORD, value.as_deref()),
            Self::C(value) => simple_tag(sink, names::C, value.as_deref()),
            Self::C1(value) => simple_tag(sink, names::C1, value.as_deref()),
            Self::C2(value) => simple_tag(sink, names::C2, value.as_deref()),
            Self::C3(value) => simple_tag(sink, names::C3, value.as_deref()),
            Self::C4(value) => simple_tag(sink, names::C4, value.as_deref()),
            Self::Clip(shape) => clip_tag(sink, names::CLIP, shape),
            Self::Fad { fade_in, fade_out } => {
                complex_tag(sink, names::FAD, [fade_in.as_str(), fade_out.as_str()])
            }
            Self::Fade(fade) => complex_tag(
                sink,
                names::FADE,
                [
                    fade.alpha1.as_str(),
                    fade.alpha2.as_str(),
                    fade.alpha3.as_str(),
                    fade.t1.as_str(),
                    fade.t2.as_str(),
                    fade.t3.as_str(),
                    fade.t4.as_str(),
                ],
            ),
            Self::FaX(value) => simple_tag(sink, names::FAX, value.as_deref()),
            Self::FaY(value) => simple_tag(sink, names::FAY, value.as_deref()),
            Self::Fe(value) => simple_tag(sink, names::FE, value.as_deref()),
            Self::Fn(value) => simple_tag(sink, names::FN, value.as_deref()),
            Self::Fr(value) => simple_tag(sink, names::FR, value.as_deref()),
            Self::FrX(value) => simple_tag(sink, names::FRX, value.as_deref()),
            Self::FrY(value) => simple_tag(sink, names::FRY, value.as_deref()),
            Self::FrZ(value) => simple_tag(sink, names::FRZ, value.as_deref()),
            Self::Fs(value) => simple_tag(sink, names::FS, value.as_ref().map(FontSize::raw)),
            Self::Fsc(value) => simple_tag(sink, names::FSC, value.as_deref()),
            Self::FscX(value) => simple_tag(sink, names::FSCX, value.as_deref()),
            Self::FscY(value) => simple_tag(sink, names::FSCY, value.as_deref()),
            Self::Fsp(value) => simple_tag(sink, names::FSP, value.as_deref()),
            Self::I(value) => simple_tag(sink, names::I, value.as_deref()),
            Self::IClip(shape) => clip_tag(sink, names::ICLIP, shape),
            Self::K(value) => simple_tag(sink, names::K, value.as_deref()),
            Self::Kf(value) => simple_tag(sink, names::KF, value.as_deref()),
            Self::Ko(value) => simple_tag(sink, names::KO, value.as_deref()),
            Self::Kt(value) => simple_tag(sink, names::KT, value.as_deref()),
            Self::KUpper(value) => simple_tag(sink, names::K_UPPER, value.as_deref()),
            Self::Move(movement) => match &movement.timing {
                Some((t1, t2)) => complex_tag(
                    sink,
                    names::MOVE,
                    [
                        movement.x1.as_str(),
                        movement.y1.as_str(),
                        movement.x2.as_str(),
                        movement.y2.as_str(),
                        t1.as_str(),
                        t2.as_str(),
                    ],
                ),
                None => complex_tag(
                    sink,
                    names::MOVE,
                    [
                        movement.x1.as_str(),
                        movement.y1.as_str(),
                        movement.x2.as_str(),
                        movement.y2.as_str(),
                    ],
                ),
            },
            Self::Org { x, y } => complex_tag(sink, names::ORG, [x.as_str(), y.as_str()]),
            Self::P(value) => simple_tag(sink, names::P, value.as_deref()),
            Self::Pbo(value) => simple_tag(sink, names::PBO, value.as_deref()),
            Self::Pos { x, y } => complex_tag(sink, names::POS, [x.as_str(), y.as_str()]),
            Self::Q(value) => simple_tag(sink, names::Q, value.as_deref()),
            Self::R(value) => simple_tag(sink, names::R, value.as_deref()),
            Self::S(value) => simple_tag(sink, names::S, value.as_deref()),
            Self::Shad(value) => simple_tag(sink, names::SHAD, value.as_deref()),
            Self::T(transform) => transform.emit(sink),
            Self::U(value) => simple_tag(sink, names::U, value.as_deref()),
            Self::XBord(value) => simple_tag(sink, names::XBORD, value.as_deref()),
            Self::XShad(value) => simple_tag(sink, names::XSHAD, value.as_deref()),
            Self::YBord(value) => simple_tag(sink, names::YBORD, value.as_deref()),
            Self::YShad(value) => simple_tag(sink, names::YSHAD, value.as_deref()),
            Self::Unknown { name, args } => {
                if args.is_empty() {
                    simple_tag(sink, name, None)
                } else {
                    complex_tag(sink, name, args.iter().map(String::as_str))
                }
            }
        }
    }
}

impl Transform {
    /// Serialise as `\t(...)`, positional arguments first, then the nested
    /// tags back to back.
    pub fn emit<W>(&self, sink: &mut W) -> Result<(), std::fmt::Error>
    where
        W: std::fmt::Write,
    {
        sink.write_str("\\t(")?;
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            sink.write_str(start)?;
            sink.write_str(",")?;
            sink.write_str(end)?;
            sink.write_str(",")?;
        }
        if let Some(accel) = &self.accel {
            sink.write_str(accel)?;
            sink.write_str(",")?;
        }
        for tag in &self.tags {
            tag.emit(sink)?;
        }
        sink.write_str(")")
    }
}
