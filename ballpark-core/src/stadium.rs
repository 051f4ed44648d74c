use crate::{error::StadiumError, geo::haversine_km, model::Coordinates};

/// A KBO ballpark.
#[derive(Debug, Clone, PartialEq)]
pub struct Stadium {
    /// Name used for selection, e.g. "대전".
    pub short_name: &'static str,
    /// Label shown in selection lists, e.g. "서울(잠실)".
    pub label: &'static str,
    /// Name the forecast API knows the stadium by.
    pub full_name: &'static str,
    pub address: &'static str,
    pub coordinates: Coordinates,
}

pub const DEFAULT_STADIUM: &str = "대전";

pub static STADIUMS: [Stadium; 9] = [
    Stadium {
        short_name: "대전",
        label: "대전",
        full_name: "대전한화생명볼파크",
        address: "대전광역시 중구 대종로 373",
        coordinates: Coordinates::new(36.317085, 127.429131),
    },
    Stadium {
        short_name: "대구",
        label: "대구",
        full_name: "대구삼성라이온즈파크",
        address: "대구광역시 수성구 야구전설로 1",
        coordinates: Coordinates::new(35.841993, 128.681336),
    },
    Stadium {
        short_name: "광주",
        label: "광주",
        full_name: "광주기아챔피언스필드",
        address: "광주광역시 북구 서림로 10",
        coordinates: Coordinates::new(35.1683, 126.8888),
    },
    Stadium {
        short_name: "인천",
        label: "인천",
        full_name: "인천SSG랜더스필드",
        address: "인천광역시 미추홀구 매소홀로 618",
        coordinates: Coordinates::new(37.435057, 126.693137),
    },
    Stadium {
        short_name: "잠실",
        label: "서울(잠실)",
        full_name: "서울종합운동장 야구장",
        address: "서울특별시 송파구 올림픽로 25",
        coordinates: Coordinates::new(37.514086, 127.074722),
    },
    Stadium {
        short_name: "고척",
        label: "서울(고척)",
        full_name: "고척스카이돔",
        address: "서울특별시 구로구 경인로 430",
        coordinates: Coordinates::new(37.498108, 126.867548),
    },
    Stadium {
        short_name: "수원",
        label: "수원",
        full_name: "수원KT위즈파크",
        address: "경기도 수원시 장안구 경수대로 893",
        coordinates: Coordinates::new(37.2996, 127.0095),
    },
    Stadium {
        short_name: "부산",
        label: "부산",
        full_name: "부산사직구장",
        address: "부산광역시 동래구 사직로 45",
        coordinates: Coordinates::new(35.194398, 129.061261),
    },
    Stadium {
        short_name: "창원",
        label: "창원",
        full_name: "창원NC파크",
        address: "경상남도 창원시 마산회원구 삼호로 63",
        coordinates: Coordinates::new(35.222488, 128.583033),
    },
];

impl Stadium {
    pub fn all() -> &'static [Stadium] {
        &STADIUMS
    }

    /// Look up a stadium by its short name.
    pub fn find(short_name: &str) -> Result<&'static Stadium, StadiumError> {
        let wanted = short_name.trim();
        STADIUMS
            .iter()
            .find(|s| s.short_name == wanted)
            .ok_or_else(|| StadiumError::Unknown(short_name.to_string()))
    }

    pub fn default_stadium() -> &'static Stadium {
        &STADIUMS[0]
    }
}

impl std::fmt::Display for Stadium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.full_name)
    }
}

/// The stadium closest to a point, with its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'a> {
    pub stadium: &'a Stadium,
    pub distance_km: f64,
}

/// Nearest stadium in `table`. Ties go to the earlier entry.
pub fn nearest_in(table: &[Stadium], point: Coordinates) -> Option<Nearest<'_>> {
    let mut best: Option<Nearest<'_>> = None;

    for stadium in table {
        let distance_km = haversine_km(point, stadium.coordinates);
        match best {
            Some(b) if b.distance_km <= distance_km => {}
            _ => best = Some(Nearest { stadium, distance_km }),
        }
    }

    best
}

/// Nearest stadium from the built-in table.
pub fn nearest(point: Coordinates) -> Nearest<'static> {
    // STADIUMS is a non-empty static array.
    nearest_in(&STADIUMS, point).unwrap_or_else(|| Nearest {
        stadium: Stadium::default_stadium(),
        distance_km: haversine_km(point, Stadium::default_stadium().coordinates),
    })
}
